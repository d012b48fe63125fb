//! The cluster intent and mirror data model shared across every crate in
//! the registry-mirror / cluster-provisioning core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A back-end driver for local Kubernetes clusters.
///
/// This workspace uses `Vanilla` as the sole name for the Kind-style
/// driver; there is no separate `Kind` variant (see `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Docker-in-Docker vanilla Kubernetes (Kind-style).
    #[default]
    Vanilla,
    /// K3s-in-Docker (K3d).
    K3s,
    /// Talos Linux in Docker.
    Talos,
    /// Virtual cluster (vCluster).
    VCluster,
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vanilla => write!(f, "Vanilla"),
            Self::K3s => write!(f, "K3s"),
            Self::Talos => write!(f, "Talos"),
            Self::VCluster => write!(f, "VCluster"),
        }
    }
}

impl std::str::FromStr for Distribution {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vanilla" | "kind" => Ok(Self::Vanilla),
            "k3s" | "k3d" => Ok(Self::K3s),
            "talos" => Ok(Self::Talos),
            "vcluster" => Ok(Self::VCluster),
            other => Err(crate::KsailError::UnknownDistribution(other.to_string())),
        }
    }
}

impl Distribution {
    /// The expected `kubectl` context name for a cluster with this
    /// distribution, following each driver's own convention.
    #[must_use]
    pub fn expected_context_name(self, cluster_name: &str) -> String {
        match self {
            Self::Vanilla => format!("kind-{cluster_name}"),
            Self::K3s => format!("k3d-{cluster_name}"),
            Self::Talos => format!("admin@{cluster_name}"),
            Self::VCluster => format!("vcluster_{cluster_name}_{cluster_name}_vcluster"),
        }
    }

    /// The expected on-disk distribution config file (or directory) name.
    #[must_use]
    pub fn expected_distribution_config_name(self) -> &'static str {
        match self {
            Self::Vanilla => "kind.yaml",
            Self::K3s => "k3d.yaml",
            Self::Talos => "talos",
            Self::VCluster => "vcluster.yaml",
        }
    }

    /// Whether this distribution's config is a directory tree rather than
    /// a single file (only Talos, whose patches are split by scope).
    #[must_use]
    pub fn config_is_directory(self) -> bool {
        matches!(self, Self::Talos)
    }
}

/// Container Network Interface choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cni {
    #[default]
    Default,
    Cilium,
    Calico,
    None,
}

/// Container Storage Interface choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Csi {
    #[default]
    Default,
    LocalPathProvisioner,
    None,
}

/// Metrics server toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricsServer {
    #[default]
    Default,
    Enabled,
    Disabled,
}

/// Load balancer provider choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancer {
    #[default]
    Default,
    Cloudprovider,
    None,
}

impl std::str::FromStr for Cni {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "cilium" => Ok(Self::Cilium),
            "calico" => Ok(Self::Calico),
            "none" => Ok(Self::None),
            other => Err(crate::KsailError::Other(format!("unknown CNI: {other}"))),
        }
    }
}

impl std::str::FromStr for Csi {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "local-path-provisioner" | "localpathprovisioner" => Ok(Self::LocalPathProvisioner),
            "none" => Ok(Self::None),
            other => Err(crate::KsailError::Other(format!("unknown CSI: {other}"))),
        }
    }
}

impl std::str::FromStr for MetricsServer {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(crate::KsailError::Other(format!(
                "unknown metrics-server setting: {other}"
            ))),
        }
    }
}

impl std::str::FromStr for LoadBalancer {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "cloudprovider" => Ok(Self::Cloudprovider),
            "none" => Ok(Self::None),
            other => Err(crate::KsailError::Other(format!(
                "unknown load balancer: {other}"
            ))),
        }
    }
}

impl std::str::FromStr for GitOpsEngine {
    type Err = crate::KsailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "flux" => Ok(Self::Flux),
            "argocd" => Ok(Self::ArgoCD),
            other => Err(crate::KsailError::Other(format!(
                "unknown GitOps engine: {other}"
            ))),
        }
    }
}

/// GitOps engine choice. Resources for either engine are always created
/// server-side during cluster bring-up, never scaffolded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitOpsEngine {
    #[default]
    None,
    Flux,
    ArgoCD,
}

/// Local registry sub-config carried on `ClusterSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalRegistryConfig {
    /// Whether a driver-native local registry should be wired up
    /// (currently only meaningful for the K3d driver; see §3 and
    /// `DESIGN.md`'s Open Question resolution).
    pub enabled: bool,
    /// Host port to publish the local registry on, when enabled.
    pub port: u16,
}

/// User-supplied intent for one pull-through mirror registry.
///
/// `host` is a DNS-style registry hostname, possibly with a port (e.g.
/// `docker.io`, `registry.example.com:443`). `remote` is the upstream URL
/// the mirror proxies. Credentials may contain `${VAR}` placeholders
/// resolved lazily against the process environment (see [`crate::env`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSpec {
    pub host: String,
    pub remote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The canonical handle passed to the Registry Backend for create/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryInfo {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub endpoints: Vec<String>,
    pub upstream: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
}

/// Full cluster intent, as loaded from `ksail.yaml` and overlaid with CLI
/// flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub distribution: Distribution,
    #[serde(default)]
    pub cni: Cni,
    #[serde(default)]
    pub csi: Csi,
    #[serde(default)]
    pub metrics_server: MetricsServer,
    #[serde(default)]
    pub load_balancer: LoadBalancer,
    #[serde(default)]
    pub gitops_engine: GitOpsEngine,
    pub control_plane_count: u8,
    pub worker_count: u8,
    pub cluster_name: String,
    #[serde(default)]
    pub mirror_specs: Vec<MirrorSpec>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub distribution_config: String,
    pub source_directory: PathBuf,
    #[serde(default)]
    pub local_registry: LocalRegistryConfig,
}

impl ClusterSpec {
    /// The context name this spec resolves to, falling back to the
    /// distribution's default when the field was left blank.
    #[must_use]
    pub fn resolved_context(&self) -> String {
        if self.context.trim().is_empty() {
            self.distribution.expected_context_name(&self.cluster_name)
        } else {
            self.context.clone()
        }
    }

    /// The distribution config path this spec resolves to, falling back to
    /// the distribution's default when the field was left blank, or when
    /// it still names the default for a *different* distribution (the
    /// scaffolder's distribution-switch detection).
    #[must_use]
    pub fn resolved_distribution_config(&self) -> String {
        let default_current = self.distribution.expected_distribution_config_name();
        if self.distribution_config.trim().is_empty() || self.distribution_config == "kind.yaml" {
            default_current.to_string()
        } else {
            self.distribution_config.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_config_choices_parse_case_insensitively() {
        assert_eq!("CILIUM".parse::<Cni>().unwrap(), Cni::Cilium);
        assert_eq!(
            "local-path-provisioner".parse::<Csi>().unwrap(),
            Csi::LocalPathProvisioner
        );
        assert_eq!("Enabled".parse::<MetricsServer>().unwrap(), MetricsServer::Enabled);
        assert_eq!("NONE".parse::<LoadBalancer>().unwrap(), LoadBalancer::None);
        assert_eq!("argocd".parse::<GitOpsEngine>().unwrap(), GitOpsEngine::ArgoCD);
        assert!("bogus".parse::<Cni>().is_err());
    }

    #[test]
    fn distribution_context_defaults() {
        assert_eq!(
            Distribution::Vanilla.expected_context_name("dev"),
            "kind-dev"
        );
        assert_eq!(Distribution::K3s.expected_context_name("dev"), "k3d-dev");
        assert_eq!(
            Distribution::Talos.expected_context_name("dev"),
            "admin@dev"
        );
    }

    #[test]
    fn distribution_parses_case_insensitively() {
        assert_eq!("VANILLA".parse::<Distribution>().unwrap(), Distribution::Vanilla);
        assert_eq!("k3d".parse::<Distribution>().unwrap(), Distribution::K3s);
        assert!("bogus".parse::<Distribution>().is_err());
    }

    #[test]
    fn distribution_config_switch_falls_back_to_default() {
        let mut spec = ClusterSpec {
            distribution: Distribution::K3s,
            cni: Cni::default(),
            csi: Csi::default(),
            metrics_server: MetricsServer::default(),
            load_balancer: LoadBalancer::default(),
            gitops_engine: GitOpsEngine::default(),
            control_plane_count: 1,
            worker_count: 0,
            cluster_name: "dev".into(),
            mirror_specs: vec![],
            context: String::new(),
            distribution_config: "kind.yaml".into(),
            source_directory: PathBuf::from("k8s"),
            local_registry: LocalRegistryConfig::default(),
        };
        assert_eq!(spec.resolved_distribution_config(), "k3d.yaml");
        spec.distribution_config = "custom.yaml".into();
        assert_eq!(spec.resolved_distribution_config(), "custom.yaml");
    }
}
