//! Rendering of `vcluster.yaml` for the vCluster distribution.
//!
//! vCluster's own values schema has no mirror-registry concept — mirrors
//! are wired up purely at the Docker-network / containerd-injection layer
//! for this driver, so this config carries just the sizing fields.

use serde::Serialize;

use ksail_core::model::ClusterSpec;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlPlane {
    #[serde(rename = "replicas")]
    replicas: u8,
}

#[derive(Debug, Serialize)]
pub struct VClusterConfig {
    #[serde(rename = "controlPlane")]
    control_plane: ControlPlane,
}

/// Build the vCluster values config: a single `controlPlane.replicas`
/// field sized from the cluster's control-plane count.
#[must_use]
pub fn build_vcluster_config(spec: &ClusterSpec) -> VClusterConfig {
    VClusterConfig {
        control_plane: ControlPlane {
            replicas: spec.control_plane_count,
        },
    }
}

/// Render `config` as YAML.
///
/// # Errors
///
/// Returns an error only if YAML serialisation fails, which does not
/// happen for this struct shape in practice.
pub fn render_vcluster_yaml(config: &VClusterConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}
