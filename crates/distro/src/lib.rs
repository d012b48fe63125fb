//! Distribution Adapters: one [`ClusterDriver`] implementation per
//! back-end, sharing a Docker-level start/stop lifecycle and an
//! update-classification diff.

pub mod diff;
pub mod docker_lifecycle;
pub mod driver;
pub mod exec;
pub mod k3s;
pub mod talos;
pub mod talos_config;
pub mod vanilla;
pub mod vcluster;

pub use diff::classify_update;
pub use driver::{resolve_name, ClusterDriver, UpdateResult};
pub use k3s::K3sDriver;
pub use talos::TalosDriver;
pub use vanilla::VanillaDriver;
pub use vcluster::VClusterDriver;

use bollard::Docker;

use ksail_core::model::Distribution;

/// Construct the right [`ClusterDriver`] for `distribution`, wired to the
/// given default cluster name and (for the Docker-backed drivers) an
/// already-connected Docker client.
#[must_use]
pub fn build_driver(
    distribution: Distribution,
    default_cluster_name: impl Into<String>,
    docker: Option<Docker>,
) -> Box<dyn ClusterDriver> {
    let default_cluster_name = default_cluster_name.into();
    match distribution {
        Distribution::Vanilla => Box::new(VanillaDriver::new(default_cluster_name, docker)),
        Distribution::K3s => Box::new(K3sDriver::new(default_cluster_name, docker)),
        Distribution::Talos => Box::new(TalosDriver::new(default_cluster_name, docker)),
        Distribution::VCluster => Box::new(VClusterDriver::new(default_cluster_name)),
    }
}
