//! Distribution-specific container label schemes for mirror registries.
//!
//! Node labels (the labels already carried by cluster node containers
//! themselves) are the distribution adapters' concern; this module only
//! builds the labels *this binary* stamps onto registry containers it
//! creates, so `ksail-registry`'s `ListRegistries` can find them again.

use std::collections::HashMap;

use ksail_core::model::Distribution;
use ksail_mirror::MirrorEntry;

/// The label key every KSail-managed registry container carries,
/// regardless of distribution.
pub const MANAGED_BY_LABEL: &str = "ksail.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "ksail";
pub const CLUSTER_LABEL: &str = "ksail.io/cluster";
pub const MIRROR_HOST_LABEL: &str = "ksail.io/mirror-host";

/// Build the label set for a mirror registry container backing `entry`
/// under `cluster`, scoped by `distribution`.
#[must_use]
pub fn registry_labels(
    distribution: Distribution,
    cluster: &str,
    entry: &MirrorEntry,
) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
    labels.insert(CLUSTER_LABEL.to_string(), cluster.to_string());
    labels.insert(MIRROR_HOST_LABEL.to_string(), entry.host.clone());
    labels.insert(
        "ksail.io/distribution".to_string(),
        distribution.to_string().to_lowercase(),
    );
    labels
}

/// The label filter used to list every KSail-managed registry container
/// for `cluster`, regardless of distribution.
#[must_use]
pub fn registry_list_filter(cluster: &str) -> HashMap<String, String> {
    let mut filters = HashMap::new();
    filters.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
    filters.insert(CLUSTER_LABEL.to_string(), cluster.to_string());
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(host: &str) -> MirrorEntry {
        MirrorEntry {
            host: host.to_string(),
            sanitized_name: "docker-io".to_string(),
            container_name: "dev-docker-io".to_string(),
            endpoint: "http://dev-docker-io:5000".to_string(),
            port: 5000,
            remote: "https://registry-1.docker.io".to_string(),
        }
    }

    #[test]
    fn registry_labels_carry_cluster_and_host() {
        let labels = registry_labels(Distribution::Vanilla, "dev", &entry("docker.io"));
        assert_eq!(labels.get(CLUSTER_LABEL).unwrap(), "dev");
        assert_eq!(labels.get(MIRROR_HOST_LABEL).unwrap(), "docker.io");
        assert_eq!(labels.get(MANAGED_BY_LABEL).unwrap(), "ksail");
        assert_eq!(labels.get("ksail.io/distribution").unwrap(), "vanilla");
    }

    #[test]
    fn list_filter_scopes_to_cluster() {
        let filter = registry_list_filter("dev");
        assert_eq!(filter.get(CLUSTER_LABEL).unwrap(), "dev");
        assert_eq!(filter.len(), 2);
    }
}
