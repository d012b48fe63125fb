//! Registry Backend: container-level operations for pull-through mirror
//! registries — create/delete/list/query-port/wait-ready, static IP
//! assignment, and the setup/cleanup sequences that wire them together.

pub mod backend;
pub mod docker;
pub mod setup;
pub mod static_ip;

pub use backend::{RegistryBackend, RegistryBackendError, RegistryCreateConfig};
pub use docker::DockerRegistryBackend;
pub use setup::{cleanup_registries, registry_infos_from_entries, setup_registries};
pub use static_ip::allocate_high_end_ip;
