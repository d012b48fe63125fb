//! Per-distribution Docker network naming, used to connect mirror
//! registries onto the same network a cluster's nodes live on.
//!
//! Each upstream driver owns this convention; this binary only needs to
//! agree with it so `docker network connect` targets the right name.

use bollard::network::InspectNetworkOptions;
use bollard::Docker;
use ksail_core::model::Distribution;

/// The Docker network a cluster's nodes (and its mirror registries)
/// attach to, per distribution.
#[must_use]
pub fn resolved_network_name(distribution: Distribution, cluster: &str) -> String {
    match distribution {
        // kind shares a single bridge network named "kind" across every
        // cluster on the host.
        Distribution::Vanilla => "kind".to_string(),
        Distribution::K3s => format!("k3d-{cluster}"),
        Distribution::Talos => cluster.to_string(),
        Distribution::VCluster => format!("vcluster.{cluster}"),
    }
}

/// Look up `network`'s IPv4 subnet CIDR from the Docker daemon, for
/// static-IP assignment. Returns `None` on any failure — callers fall
/// back to DHCP, the same as an unparseable CIDR.
pub async fn inspect_network_cidr(docker: &Docker, network: &str) -> Option<String> {
    let inspect = docker
        .inspect_network(network, None::<InspectNetworkOptions<String>>)
        .await
        .ok()?;
    inspect
        .ipam?
        .config?
        .into_iter()
        .find_map(|config| config.subnet)
}
