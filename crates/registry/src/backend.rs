//! The Registry Backend contract: container-level operations any concrete
//! driver (the Docker Engine API, or a test fake) must fulfil.

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by a [`RegistryBackend`] implementation.
#[derive(Debug, Error)]
pub enum RegistryBackendError {
    #[error("docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("operation cancelled during {phase}")]
    Cancelled { phase: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RegistryBackendError>;

/// Configuration for creating (or reusing) one mirror registry container.
#[derive(Debug, Clone)]
pub struct RegistryCreateConfig {
    /// The container name, e.g. `kind-docker-io`.
    pub name: String,
    /// The upstream URL the mirror proxies (`REGISTRY_PROXY_REMOTEURL`).
    pub upstream: String,
    /// Labels identifying this container as a KSail mirror registry,
    /// distribution-scheme dependent.
    pub labels: HashMap<String, String>,
    /// Optional named volume to back `/var/lib/registry`.
    pub volume: Option<String>,
}

/// Abstracts container-level operations for mirror registries. Any
/// concrete driver (the Docker Engine API, or a test fake) fulfils this
/// trait; selection is dependency-injected through a constructor argument,
/// never a process-wide static.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Create or reuse a container named `cfg.name` running the
    /// `registry:2` image. Idempotent: an existing healthy container with
    /// that name is a success, not an error.
    async fn create_registry(&self, cfg: &RegistryCreateConfig) -> Result<()>;

    /// Disconnect from `network` if connected, then remove the container.
    /// If `delete_volume` is set, also remove `volume` (when given). A
    /// missing container is a success.
    async fn delete_registry(
        &self,
        name: &str,
        network: Option<&str>,
        delete_volume: bool,
        volume: Option<&str>,
    ) -> Result<()>;

    /// Return every container labelled as a KSail registry matching
    /// `label_filters`.
    async fn list_registries(
        &self,
        label_filters: &HashMap<String, String>,
    ) -> Result<Vec<String>>;

    /// Return the host-side published port for `name`, or `0` if none is
    /// published.
    async fn get_registry_port(&self, name: &str) -> Result<u16>;

    /// Connect `name` to `network`, optionally with a static IP.
    async fn connect_network(
        &self,
        name: &str,
        network: &str,
        static_ip: Option<IpAddr>,
    ) -> Result<()>;

    /// Block until every registry responds to a TCP connect on port 5000
    /// at its in-network IP, or `token` is cancelled.
    async fn wait_for_registries_ready(
        &self,
        ips: &[IpAddr],
        token: CancellationToken,
    ) -> Result<()>;
}
