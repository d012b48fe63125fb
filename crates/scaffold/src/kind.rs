//! Rendering of `kind.yaml` for the Vanilla (Kind-style) distribution,
//! including the `extraMounts` that bind each mirror's `hosts.toml`
//! directory into every node.

use std::path::Path;

use serde::Serialize;

use ksail_core::model::ClusterSpec;
use ksail_mirror::MirrorEntry;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtraMount {
    host_path: String,
    container_path: String,
    read_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KindNode {
    role: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_mounts: Vec<ExtraMount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindConfig {
    api_version: String,
    kind: String,
    name: String,
    nodes: Vec<KindNode>,
}

/// Build the Kind-style cluster config: one `control-plane` node plus
/// `worker_count` `worker` nodes, each mounting every mirror's
/// `<mirrorsDir>/<host>` directory read-only at
/// `/etc/containerd/certs.d/<host>`.
#[must_use]
pub fn build_kind_config(spec: &ClusterSpec, mirrors_dir: &Path, entries: &[MirrorEntry]) -> KindConfig {
    let extra_mounts: Vec<ExtraMount> = entries
        .iter()
        .map(|entry| ExtraMount {
            host_path: mirrors_dir.join(&entry.host).display().to_string(),
            container_path: format!("/etc/containerd/certs.d/{}", entry.host),
            read_only: true,
        })
        .collect();

    let mut nodes = vec![KindNode {
        role: "control-plane".to_string(),
        extra_mounts: extra_mounts.clone(),
    }];
    for _ in 0..spec.worker_count {
        nodes.push(KindNode {
            role: "worker".to_string(),
            extra_mounts: extra_mounts.clone(),
        });
    }
    // Additional control-plane replicas beyond the first, for HA setups.
    for _ in 1..spec.control_plane_count {
        nodes.insert(
            1,
            KindNode {
                role: "control-plane".to_string(),
                extra_mounts: extra_mounts.clone(),
            },
        );
    }

    KindConfig {
        api_version: "kind.x-k8s.io/v1alpha4".to_string(),
        kind: "Cluster".to_string(),
        name: spec.cluster_name.clone(),
        nodes,
    }
}

/// Render `config` as YAML.
///
/// # Errors
///
/// Returns an error only if YAML serialisation fails, which does not
/// happen for this struct shape in practice.
pub fn render_kind_yaml(config: &KindConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksail_core::model::{
        Cni, Csi, Distribution, GitOpsEngine, LoadBalancer, LocalRegistryConfig, MetricsServer,
    };
    use std::path::PathBuf;

    fn spec(worker_count: u8) -> ClusterSpec {
        ClusterSpec {
            distribution: Distribution::Vanilla,
            cni: Cni::default(),
            csi: Csi::default(),
            metrics_server: MetricsServer::default(),
            load_balancer: LoadBalancer::default(),
            gitops_engine: GitOpsEngine::default(),
            control_plane_count: 1,
            worker_count,
            cluster_name: "dev".into(),
            mirror_specs: vec![],
            context: String::new(),
            distribution_config: String::new(),
            source_directory: PathBuf::from("k8s"),
            local_registry: LocalRegistryConfig::default(),
        }
    }

    fn entry() -> MirrorEntry {
        MirrorEntry {
            host: "docker.io".into(),
            sanitized_name: "docker-io".into(),
            container_name: "kind-docker-io".into(),
            endpoint: "http://kind-docker-io:5000".into(),
            port: 5000,
            remote: "https://registry-1.docker.io".into(),
        }
    }

    #[test]
    fn extra_mounts_bind_every_mirror_on_every_node() {
        let cfg = build_kind_config(&spec(2), Path::new("/tmp/out/kind/mirrors"), &[entry()]);
        assert_eq!(cfg.nodes.len(), 3); // 1 control-plane + 2 workers
        for node in &cfg.nodes {
            assert_eq!(node.extra_mounts.len(), 1);
            assert_eq!(
                node.extra_mounts[0].container_path,
                "/etc/containerd/certs.d/docker.io"
            );
            assert!(node.extra_mounts[0].host_path.ends_with("docker.io"));
            assert!(node.extra_mounts[0].read_only);
        }
    }

    #[test]
    fn renders_valid_yaml() {
        let cfg = build_kind_config(&spec(0), Path::new("/tmp/out/kind/mirrors"), &[entry()]);
        let rendered = render_kind_yaml(&cfg).unwrap();
        assert!(rendered.contains("apiVersion: kind.x-k8s.io/v1alpha4"));
        assert!(rendered.contains("extraMounts"));
    }
}
