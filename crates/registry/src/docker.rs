//! The Docker Engine API driver for the Registry Backend, talking to the
//! local daemon over `bollard`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
};
use bollard::network::{ConnectNetworkOptions, DisconnectNetworkOptions};
use bollard::secret::{EndpointIpamConfig, EndpointSettings, HostConfig, PortBinding};
use bollard::volume::RemoveVolumeOptions;
use bollard::Docker;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{RegistryBackend, RegistryBackendError, RegistryCreateConfig, Result};

/// The image every mirror registry container runs.
const REGISTRY_IMAGE: &str = "registry:2";
/// The port every mirror registry listens on internally.
const REGISTRY_PORT: u16 = 5000;
/// Polling interval while waiting for registries to become reachable.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A [`RegistryBackend`] backed by the local Docker Engine API.
pub struct DockerRegistryBackend {
    docker: Docker,
}

impl DockerRegistryBackend {
    /// Connect to the local Docker daemon using the platform default
    /// transport (unix socket on Linux/macOS, named pipe on Windows).
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Wrap an already-connected client (used by callers that share one
    /// `Docker` handle across the registry, injector, and distro crates).
    #[must_use]
    pub fn from_client(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl RegistryBackend for DockerRegistryBackend {
    async fn create_registry(&self, cfg: &RegistryCreateConfig) -> Result<()> {
        let existing = self
            .docker
            .inspect_container(&cfg.name, None)
            .await;
        if existing.is_ok() {
            debug!(name = %cfg.name, "registry container already exists, reusing");
            return Ok(());
        }

        let mut binds = Vec::new();
        if let Some(volume) = &cfg.volume {
            binds.push(format!("{volume}:/var/lib/registry"));
        }

        let options = CreateContainerOptions {
            name: cfg.name.clone(),
            platform: None,
        };
        let container_config = Config {
            image: Some(REGISTRY_IMAGE.to_string()),
            env: Some(vec![
                format!("REGISTRY_PROXY_REMOTEURL={}", cfg.upstream),
                format!("REGISTRY_HTTP_ADDR=:{REGISTRY_PORT}"),
            ]),
            labels: Some(cfg.labels.clone()),
            host_config: Some(HostConfig {
                binds: if binds.is_empty() { None } else { Some(binds) },
                restart_policy: None,
                ..Default::default()
            }),
            ..Default::default()
        };

        self.docker
            .create_container(Some(options), container_config)
            .await?;
        self.docker
            .start_container::<String>(&cfg.name, None)
            .await?;
        info!(name = %cfg.name, upstream = %cfg.upstream, "created mirror registry container");
        Ok(())
    }

    async fn delete_registry(
        &self,
        name: &str,
        network: Option<&str>,
        delete_volume: bool,
        volume: Option<&str>,
    ) -> Result<()> {
        if let Some(network) = network {
            let disconnect = self
                .docker
                .disconnect_network(
                    network,
                    DisconnectNetworkOptions {
                        container: name.to_string(),
                        force: true,
                    },
                )
                .await;
            if let Err(err) = disconnect {
                debug!(name, network, %err, "network disconnect failed, continuing");
            }
        }

        let remove = self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    v: delete_volume,
                    ..Default::default()
                }),
            )
            .await;
        match remove {
            Ok(()) | Err(bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }) => {}
            Err(err) => return Err(err.into()),
        }

        if delete_volume {
            if let Some(volume) = volume {
                let remove_volume = self
                    .docker
                    .remove_volume(volume, Some(RemoveVolumeOptions { force: true }))
                    .await;
                if let Err(err) = remove_volume {
                    warn!(volume, %err, "failed to remove mirror registry volume");
                }
            }
        }

        Ok(())
    }

    async fn list_registries(
        &self,
        label_filters: &HashMap<String, String>,
    ) -> Result<Vec<String>> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        let label_values: Vec<String> = label_filters
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        filters.insert("label".to_string(), label_values);

        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters,
                ..Default::default()
            }))
            .await?;

        Ok(containers
            .into_iter()
            .filter_map(|c| c.names.and_then(|names| names.into_iter().next()))
            .map(|name| name.trim_start_matches('/').to_string())
            .collect())
    }

    async fn get_registry_port(&self, name: &str) -> Result<u16> {
        let inspect = self.docker.inspect_container(name, None).await?;
        let port = inspect
            .network_settings
            .and_then(|settings| settings.ports)
            .and_then(|ports| ports.get(&format!("{REGISTRY_PORT}/tcp")).cloned().flatten())
            .and_then(|bindings: Vec<PortBinding>| bindings.into_iter().next())
            .and_then(|binding| binding.host_port)
            .and_then(|port_str| port_str.parse::<u16>().ok())
            .unwrap_or(0);
        Ok(port)
    }

    async fn connect_network(
        &self,
        name: &str,
        network: &str,
        static_ip: Option<IpAddr>,
    ) -> Result<()> {
        let ipam_config = static_ip.map(|ip| EndpointIpamConfig {
            ipv4_address: Some(ip.to_string()),
            ..Default::default()
        });

        self.docker
            .connect_network(
                network,
                ConnectNetworkOptions {
                    container: name.to_string(),
                    endpoint_config: EndpointSettings {
                        ipam_config,
                        ..Default::default()
                    },
                },
            )
            .await?;
        Ok(())
    }

    async fn wait_for_registries_ready(
        &self,
        ips: &[IpAddr],
        token: CancellationToken,
    ) -> Result<()> {
        let mut pending: Vec<IpAddr> = ips.to_vec();
        while !pending.is_empty() {
            if token.is_cancelled() {
                return Err(RegistryBackendError::Cancelled {
                    phase: "waiting for mirror registries to become ready".to_string(),
                });
            }
            let mut still_pending = Vec::new();
            for ip in pending {
                let addr = (ip, REGISTRY_PORT);
                match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr))
                    .await
                {
                    Ok(Ok(_stream)) => {
                        debug!(%ip, "mirror registry ready");
                    }
                    _ => still_pending.push(ip),
                }
            }
            pending = still_pending;
            if !pending.is_empty() {
                tokio::select! {
                    () = tokio::time::sleep(READY_POLL_INTERVAL) => {}
                    () = token.cancelled() => {
                        return Err(RegistryBackendError::Cancelled {
                            phase: "waiting for mirror registries to become ready".to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
