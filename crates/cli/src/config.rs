//! Two-phase cluster spec loading: `ksail.yaml` is loaded via `serde_yaml`
//! with `anyhow::Context`-wrapped errors naming the path, then CLI flags
//! overlay `Option<T>` fields before distribution-dependent defaults are
//! filled in.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ksail_core::model::{
    Cni, Csi, GitOpsEngine, LoadBalancer, LocalRegistryConfig, MetricsServer, MirrorSpec,
};
use ksail_core::model::{ClusterSpec, Distribution};

/// The on-disk root config filename.
pub const KSAIL_YAML: &str = "ksail.yaml";

/// CLI-flag overlay applied on top of a loaded (or freshly defaulted)
/// [`ClusterSpec`]. Every field is optional: `None` means "leave whatever
/// was loaded/defaulted alone".
#[derive(Debug, Default, Clone)]
pub struct ClusterSpecOverlay {
    pub distribution: Option<Distribution>,
    pub cni: Option<Cni>,
    pub csi: Option<Csi>,
    pub metrics_server: Option<MetricsServer>,
    pub load_balancer: Option<LoadBalancer>,
    pub gitops_engine: Option<GitOpsEngine>,
    pub control_plane_count: Option<u8>,
    pub worker_count: Option<u8>,
    pub cluster_name: Option<String>,
    pub mirrors: Option<Vec<String>>,
    pub context: Option<String>,
    pub distribution_config: Option<String>,
    pub source_directory: Option<PathBuf>,
    pub local_registry_enabled: Option<bool>,
    pub local_registry_port: Option<u16>,
}

/// Load `<out_dir>/ksail.yaml` if present.
pub fn load_cluster_spec(out_dir: &Path) -> Result<Option<ClusterSpec>> {
    let path = out_dir.join(KSAIL_YAML);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let spec: ClusterSpec = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(spec))
}

/// The bare-minimum default spec used when no `ksail.yaml` exists yet and
/// the overlay doesn't fill in every field.
fn default_spec() -> ClusterSpec {
    ClusterSpec {
        distribution: Distribution::default(),
        cni: Cni::default(),
        csi: Csi::default(),
        metrics_server: MetricsServer::default(),
        load_balancer: LoadBalancer::default(),
        gitops_engine: GitOpsEngine::default(),
        control_plane_count: 1,
        worker_count: 1,
        cluster_name: "ksail-default".to_string(),
        mirror_specs: Vec::new(),
        context: String::new(),
        distribution_config: String::new(),
        source_directory: PathBuf::from("k8s"),
        local_registry: LocalRegistryConfig::default(),
    }
}

/// Apply `overlay` on top of `base` (or a fresh default when `base` is
/// `None`), then fill in distribution-dependent defaults for any field
/// still left blank.
pub fn resolve_spec(base: Option<ClusterSpec>, overlay: &ClusterSpecOverlay) -> ClusterSpec {
    let mut spec = base.unwrap_or_else(default_spec);

    if let Some(d) = overlay.distribution {
        spec.distribution = d;
    }
    if let Some(v) = overlay.cni {
        spec.cni = v;
    }
    if let Some(v) = overlay.csi {
        spec.csi = v;
    }
    if let Some(v) = overlay.metrics_server {
        spec.metrics_server = v;
    }
    if let Some(v) = overlay.load_balancer {
        spec.load_balancer = v;
    }
    if let Some(v) = overlay.gitops_engine {
        spec.gitops_engine = v;
    }
    if let Some(v) = overlay.control_plane_count {
        spec.control_plane_count = v;
    }
    if let Some(v) = overlay.worker_count {
        spec.worker_count = v;
    }
    if let Some(v) = &overlay.cluster_name {
        spec.cluster_name = v.clone();
    }
    if let Some(raw_mirrors) = &overlay.mirrors {
        let flag_specs: Vec<MirrorSpec> = raw_mirrors
            .iter()
            .filter_map(|raw| ksail_mirror::parse_one(raw))
            .collect();
        spec.mirror_specs = ksail_mirror::merge(&spec.mirror_specs, &flag_specs);
    }
    if let Some(v) = &overlay.context {
        spec.context = v.clone();
    }
    if let Some(v) = &overlay.distribution_config {
        spec.distribution_config = v.clone();
    }
    if let Some(v) = &overlay.source_directory {
        spec.source_directory = v.clone();
    }
    if let Some(v) = overlay.local_registry_enabled {
        spec.local_registry.enabled = v;
    }
    if let Some(v) = overlay.local_registry_port {
        spec.local_registry.port = v;
    }

    // Fill in distribution-dependent defaults left blank.
    spec.context = spec.resolved_context();
    spec.distribution_config = spec.resolved_distribution_config();
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_on_fresh_default_fills_distribution_defaults() {
        let overlay = ClusterSpecOverlay {
            cluster_name: Some("dev".to_string()),
            distribution: Some(Distribution::K3s),
            ..Default::default()
        };
        let spec = resolve_spec(None, &overlay);
        assert_eq!(spec.cluster_name, "dev");
        assert_eq!(spec.context, "k3d-dev");
        assert_eq!(spec.distribution_config, "k3d.yaml");
    }

    #[test]
    fn overlay_preserves_loaded_fields_not_named() {
        let loaded = ClusterSpec {
            distribution: Distribution::Talos,
            cni: Cni::default(),
            csi: Csi::default(),
            metrics_server: MetricsServer::default(),
            load_balancer: LoadBalancer::default(),
            gitops_engine: GitOpsEngine::default(),
            control_plane_count: 3,
            worker_count: 2,
            cluster_name: "prod".to_string(),
            mirror_specs: vec![],
            context: String::new(),
            distribution_config: String::new(),
            source_directory: PathBuf::from("k8s"),
            local_registry: LocalRegistryConfig::default(),
        };
        let overlay = ClusterSpecOverlay::default();
        let spec = resolve_spec(Some(loaded), &overlay);
        assert_eq!(spec.control_plane_count, 3);
        assert_eq!(spec.context, "admin@prod");
    }

    #[test]
    fn mirror_overlay_merges_by_host_flag_wins() {
        let loaded = ClusterSpec {
            mirror_specs: vec![MirrorSpec {
                host: "docker.io".to_string(),
                remote: "https://old.example.com".to_string(),
                username: None,
                password: None,
            }],
            ..default_spec()
        };
        let overlay = ClusterSpecOverlay {
            mirrors: Some(vec!["docker.io=https://new.example.com".to_string()]),
            ..Default::default()
        };
        let spec = resolve_spec(Some(loaded), &overlay);
        assert_eq!(spec.mirror_specs.len(), 1);
        assert_eq!(spec.mirror_specs[0].remote, "https://new.example.com");
    }
}
