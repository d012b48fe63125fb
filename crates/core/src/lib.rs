//! Shared data model and sentinel errors for KSail's registry-mirror and
//! cluster-provisioning core.
//!
//! This crate has no I/O of its own: every type here is a plain, `serde`
//! derived value that the rest of the workspace (`ksail-mirror`,
//! `ksail-registry`, `ksail-injector`, `ksail-scaffold`, `ksail-distro`)
//! builds on top of.

pub mod env;
pub mod error;
pub mod model;
pub mod port;
pub mod sanitize;

pub use error::{KsailError, Result};
pub use model::{
    Cni, Csi, GitOpsEngine, LoadBalancer, LocalRegistryConfig, MetricsServer, MirrorSpec,
    RegistryInfo,
};
pub use port::PortAllocator;
