//! Rendering of `k3d.yaml` (K3d's `SimpleConfig`) for the K3s distribution,
//! including the rendered mirror block and the conditional K3s extra args
//! derived from CNI/feature toggles.

use serde::Serialize;

use ksail_core::model::{Cni, ClusterSpec, Csi, LoadBalancer, MetricsServer};
use ksail_mirror::{build_host_endpoint_map, render_k3d_mirror_config, MirrorEntry};

#[derive(Debug, Serialize)]
struct K3dExtraArg {
    arg: String,
    #[serde(rename = "nodeFilters")]
    node_filters: Vec<String>,
}

#[derive(Debug, Serialize)]
struct K3dRegistriesCreate {
    name: String,
    host: String,
    #[serde(rename = "hostPort")]
    host_port: String,
}

#[derive(Debug, Serialize)]
struct K3dOptionsK3s {
    #[serde(rename = "extraArgs", skip_serializing_if = "Vec::is_empty")]
    extra_args: Vec<K3dExtraArg>,
}

#[derive(Debug, Serialize)]
struct K3dOptions {
    k3s: K3dOptionsK3s,
}

/// The pieces needed to render `k3d.yaml`: the typed `SimpleConfig`
/// fields plus the raw mirror YAML block (spliced in after serialisation,
/// since K3d's `Registries.Config` field is itself a YAML document).
#[derive(Debug)]
pub struct K3dConfig {
    metadata_name: String,
    servers: u8,
    agents: u8,
    extra_args: Vec<K3dExtraArg>,
    registries_create: Option<K3dRegistriesCreate>,
    mirror_config_block: Option<String>,
}

/// Build the K3d cluster config: server/agent counts, conditional K3s
/// extra args per CNI/feature toggles, and the rendered mirror block
/// (extended with a local-registry entry when the K3d-native local
/// registry is enabled).
#[must_use]
pub fn build_k3d_config(spec: &ClusterSpec, entries: &[MirrorEntry]) -> K3dConfig {
    let mut extra_args = Vec::new();
    let all_servers = vec!["server:*".to_string()];

    if matches!(spec.cni, Cni::Cilium | Cni::Calico) {
        extra_args.push(K3dExtraArg {
            arg: "--flannel-backend=none".to_string(),
            node_filters: all_servers.clone(),
        });
        extra_args.push(K3dExtraArg {
            arg: "--disable-network-policy".to_string(),
            node_filters: all_servers.clone(),
        });
    }
    if matches!(spec.metrics_server, MetricsServer::Disabled) {
        extra_args.push(K3dExtraArg {
            arg: "--disable=metrics-server".to_string(),
            node_filters: all_servers.clone(),
        });
    }
    if matches!(spec.csi, Csi::None) {
        extra_args.push(K3dExtraArg {
            arg: "--disable=local-storage".to_string(),
            node_filters: all_servers.clone(),
        });
    }
    if matches!(spec.load_balancer, LoadBalancer::None) {
        extra_args.push(K3dExtraArg {
            arg: "--disable=servicelb".to_string(),
            node_filters: all_servers.clone(),
        });
    }

    let mut map = build_host_endpoint_map(entries);
    let registries_create = if spec.local_registry.enabled {
        let registry_name = format!("{}-local-registry", spec.cluster_name);
        // K3d publishes the local registry's host port by default (see
        // DESIGN.md's Open Question resolution for local-registry port
        // publishing).
        map.insert(
            registry_name.clone(),
            vec![format!(
                "http://{registry_name}:{}",
                spec.local_registry.port
            )],
        );
        Some(K3dRegistriesCreate {
            name: registry_name,
            host: "0.0.0.0".to_string(),
            host_port: spec.local_registry.port.to_string(),
        })
    } else {
        None
    };

    let mirror_config_block = if map.is_empty() {
        None
    } else {
        Some(render_k3d_mirror_config(&map))
    };

    K3dConfig {
        metadata_name: spec.cluster_name.clone(),
        servers: spec.control_plane_count,
        agents: spec.worker_count,
        extra_args,
        registries_create,
        mirror_config_block,
    }
}

/// Render `config` as `k3d.yaml`: a typed YAML head (apiVersion, kind,
/// metadata, servers/agents, options, registries.create) followed by the
/// raw `registries.config` mirror block, indented to nest under
/// `registries:`.
#[must_use]
pub fn render_k3d_yaml(config: &K3dConfig) -> String {
    #[derive(Serialize)]
    struct Head<'a> {
        #[serde(rename = "apiVersion")]
        api_version: &'static str,
        kind: &'static str,
        metadata: Metadata<'a>,
        servers: u8,
        agents: u8,
        options: K3dOptions,
        #[serde(skip_serializing_if = "Option::is_none")]
        registries: Option<RegistriesCreateOnly>,
    }
    #[derive(Serialize)]
    struct Metadata<'a> {
        name: &'a str,
    }
    #[derive(Serialize)]
    struct RegistriesCreateOnly {
        create: K3dRegistriesCreate,
    }

    let head = Head {
        api_version: "k3d.io/v1alpha5",
        kind: "Simple",
        metadata: Metadata {
            name: &config.metadata_name,
        },
        servers: config.servers,
        agents: config.agents,
        options: K3dOptions {
            k3s: K3dOptionsK3s {
                extra_args: config
                    .extra_args
                    .iter()
                    .map(|a| K3dExtraArg {
                        arg: a.arg.clone(),
                        node_filters: a.node_filters.clone(),
                    })
                    .collect(),
            },
        },
        registries: config
            .registries_create
            .as_ref()
            .map(|create| RegistriesCreateOnly {
                create: K3dRegistriesCreate {
                    name: create.name.clone(),
                    host: create.host.clone(),
                    host_port: create.host_port.clone(),
                },
            }),
    };

    let mut out = serde_yaml::to_string(&head).expect("K3dConfig serialises without error");
    if let Some(block) = &config.mirror_config_block {
        // Splice the free-form mirror block under `registries.config`,
        // indented two spaces to nest under the `registries:` key K3d
        // created above (or a fresh one, if no `registries.create` entry
        // was emitted).
        if config.registries_create.is_none() {
            out.push_str("registries:\n");
        }
        out.push_str("  config: |\n");
        for line in block.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksail_core::model::{Csi, Distribution, GitOpsEngine, LoadBalancer, LocalRegistryConfig};
    use std::path::PathBuf;

    fn spec() -> ClusterSpec {
        ClusterSpec {
            distribution: Distribution::K3s,
            cni: Cni::Cilium,
            csi: Csi::default(),
            metrics_server: MetricsServer::default(),
            load_balancer: LoadBalancer::default(),
            gitops_engine: GitOpsEngine::default(),
            control_plane_count: 1,
            worker_count: 2,
            cluster_name: "dev".into(),
            mirror_specs: vec![],
            context: String::new(),
            distribution_config: String::new(),
            source_directory: PathBuf::from("k8s"),
            local_registry: LocalRegistryConfig::default(),
        }
    }

    #[test]
    fn cilium_disables_flannel_and_network_policy() {
        let cfg = build_k3d_config(&spec(), &[]);
        let args: Vec<&str> = cfg.extra_args.iter().map(|a| a.arg.as_str()).collect();
        assert!(args.contains(&"--flannel-backend=none"));
        assert!(args.contains(&"--disable-network-policy"));
    }

    #[test]
    fn disabled_csi_and_load_balancer_add_disable_args() {
        let mut spec = spec();
        spec.cni = Cni::Default;
        spec.csi = Csi::None;
        spec.load_balancer = LoadBalancer::None;
        let cfg = build_k3d_config(&spec, &[]);
        let args: Vec<&str> = cfg.extra_args.iter().map(|a| a.arg.as_str()).collect();
        assert!(args.contains(&"--disable=local-storage"));
        assert!(args.contains(&"--disable=servicelb"));
    }

    #[test]
    fn default_cni_adds_no_extra_args() {
        let mut spec = spec();
        spec.cni = Cni::Default;
        let cfg = build_k3d_config(&spec, &[]);
        assert!(cfg.extra_args.is_empty());
    }

    #[test]
    fn renders_servers_and_agents() {
        let cfg = build_k3d_config(&spec(), &[]);
        let yaml = render_k3d_yaml(&cfg);
        assert!(yaml.contains("servers: 1"));
        assert!(yaml.contains("agents: 2"));
    }

    #[test]
    fn local_registry_extends_mirror_block_and_publishes_host_port() {
        let mut spec = spec();
        spec.local_registry = LocalRegistryConfig {
            enabled: true,
            port: 5050,
        };
        let cfg = build_k3d_config(&spec, &[]);
        assert!(cfg.registries_create.is_some());
        let yaml = render_k3d_yaml(&cfg);
        assert!(yaml.contains("dev-local-registry"));
        assert!(yaml.contains("5050"));
    }

    #[test]
    fn no_mirrors_and_no_local_registry_emits_no_registries_block() {
        let mut spec = spec();
        spec.local_registry = LocalRegistryConfig::default();
        let cfg = build_k3d_config(&spec, &[]);
        let yaml = render_k3d_yaml(&cfg);
        assert!(!yaml.contains("registries:"));
    }
}
