//! The cluster bring-up orchestrator: a seven-step state machine
//! (scaffold -> setup registries -> create cluster -> connect registries
//! -> wait ready -> inject hosts.toml -> installers), persisted to an
//! on-disk state file so an interrupted run resumes from the last
//! completed step rather than starting over.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ksail_core::model::{ClusterSpec, Distribution, MetricsServer};
use ksail_core::PortAllocator;
use ksail_distro::ClusterDriver;
use ksail_injector::HostsTomlContent;
use ksail_mirror::{build_mirror_entries, build_host_endpoint_map, render_hosts_toml, MirrorEntry};
use ksail_registry::{cleanup_registries, setup_registries, RegistryBackend};

use crate::installer;
use crate::labels::registry_labels;
use crate::ui;

/// The seven steps of cluster bring-up, in their fixed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BringUpStep {
    NotStarted,
    Scaffold,
    SetupRegistries,
    CreateCluster,
    ConnectRegistries,
    WaitReady,
    InjectMirrors,
    Installers,
    Complete,
}

impl BringUpStep {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::NotStarted => Self::Scaffold,
            Self::Scaffold => Self::SetupRegistries,
            Self::SetupRegistries => Self::CreateCluster,
            Self::CreateCluster => Self::ConnectRegistries,
            Self::ConnectRegistries => Self::WaitReady,
            Self::WaitReady => Self::InjectMirrors,
            Self::InjectMirrors => Self::Installers,
            Self::Installers | Self::Complete => Self::Complete,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::Scaffold => "Scaffolding cluster config",
            Self::SetupRegistries => "Creating mirror registry containers",
            Self::CreateCluster => "Creating cluster",
            Self::ConnectRegistries => "Connecting registries to cluster network",
            Self::WaitReady => "Waiting for registries to be reachable",
            Self::InjectMirrors => "Injecting hosts.toml into cluster nodes",
            Self::Installers => "Installing CSI / GitOps engine",
            Self::Complete => "Complete",
        }
    }

    #[must_use]
    pub const fn step_number(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::Scaffold => 1,
            Self::SetupRegistries => 2,
            Self::CreateCluster => 3,
            Self::ConnectRegistries => 4,
            Self::WaitReady => 5,
            Self::InjectMirrors => 6,
            Self::Installers => 7,
            Self::Complete => 8,
        }
    }

    pub const TOTAL_STEPS: u8 = 7;
}

impl std::fmt::Display for BringUpStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Persisted bring-up progress, so a failed `ksail up` can resume instead
/// of restarting from the beginning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BringUpState {
    pub step: BringUpStep,
    pub attempt_count: u32,
    pub last_error: Option<String>,
}

impl BringUpState {
    fn state_file(out_dir: &Path) -> PathBuf {
        out_dir.join(".ksail").join("state.json")
    }

    fn load(out_dir: &Path) -> Result<Self> {
        let path = Self::state_file(out_dir);
        if !path.exists() {
            return Ok(Self {
                step: BringUpStep::NotStarted,
                attempt_count: 0,
                last_error: None,
            });
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn save(&self, out_dir: &Path) -> Result<()> {
        let path = Self::state_file(out_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("serializing bring-up state")?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))
    }

    fn advance(&mut self, out_dir: &Path) -> Result<()> {
        self.step = self.step.next();
        self.attempt_count = 0;
        self.last_error = None;
        self.save(out_dir)
    }

    fn record_error(&mut self, out_dir: &Path, error: &str) -> Result<()> {
        self.attempt_count += 1;
        self.last_error = Some(error.to_string());
        self.save(out_dir)
    }
}

/// Everything the orchestrator needs beyond the cluster spec itself.
pub struct BringUpContext<'a> {
    pub out_dir: PathBuf,
    pub spec: ClusterSpec,
    pub force: bool,
    pub driver: &'a dyn ClusterDriver,
    pub registry_backend: &'a dyn RegistryBackend,
    pub docker: &'a bollard::Docker,
    pub http_client: &'a reqwest::Client,
    pub network: String,
    pub network_cidr: Option<String>,
    pub installer_timeout: Duration,
    pub token: CancellationToken,
}

/// Run the full seven-step bring-up sequence against `ctx`, resuming from
/// any previously persisted [`BringUpState`] in `ctx.out_dir`.
pub async fn run_bring_up(ctx: BringUpContext<'_>) -> Result<()> {
    let mut state = BringUpState::load(&ctx.out_dir)?;
    if state.step == BringUpStep::Complete {
        ui::print_success("cluster already up to date");
        return Ok(());
    }
    if state.step == BringUpStep::NotStarted {
        state.advance(&ctx.out_dir)?;
    }

    ui::print_section(&format!("Bringing up cluster '{}'", ctx.spec.cluster_name));

    let mut existing_hosts = std::collections::HashSet::new();
    let mut ports = PortAllocator::default();
    let container_prefix = ctx.spec.cluster_name.clone();
    let entries: Vec<MirrorEntry> = build_mirror_entries(
        &ctx.spec.mirror_specs,
        &container_prefix,
        &mut existing_hosts,
        &mut ports,
    );

    let mut assigned_ips: Vec<IpAddr> = Vec::new();

    loop {
        ui::print_progress_step(
            state.step.step_number(),
            BringUpStep::TOTAL_STEPS,
            state.step.description(),
        );

        let outcome = execute_step(&ctx, &state.step, &entries, &mut assigned_ips).await;
        match outcome {
            Ok(()) => {
                if state.step == BringUpStep::Installers {
                    state.advance(&ctx.out_dir)?;
                    ui::print_success("bring-up complete");
                    return Ok(());
                }
                state.advance(&ctx.out_dir)?;
            }
            Err(err) => {
                state.record_error(&ctx.out_dir, &err.to_string())?;
                ui::print_error(&format!(
                    "bring-up failed at step '{}': {err}",
                    state.step
                ));
                ui::print_info("state saved; re-run the same command to resume");
                return Err(err);
            }
        }
    }
}

async fn execute_step(
    ctx: &BringUpContext<'_>,
    step: &BringUpStep,
    entries: &[MirrorEntry],
    assigned_ips: &mut Vec<IpAddr>,
) -> Result<()> {
    match step {
        BringUpStep::NotStarted | BringUpStep::Complete => Ok(()),
        BringUpStep::Scaffold => {
            let report = ksail_scaffold::scaffold(&ctx.out_dir, &ctx.spec, entries, ctx.force)
                .context("scaffolding cluster config")?;
            for notification in &report.notifications {
                ui::print_info(&notification.message);
            }
            Ok(())
        }
        BringUpStep::SetupRegistries => {
            let distribution = ctx.spec.distribution;
            let cluster = ctx.spec.cluster_name.clone();
            let use_static_ips = matches!(distribution, Distribution::Talos);
            let assigned = setup_registries(
                ctx.registry_backend,
                entries,
                &ctx.network,
                ctx.network_cidr.as_deref(),
                use_static_ips,
                |entry| registry_labels(distribution, &cluster, entry),
                ctx.token.clone(),
            )
            .await
            .context("setting up mirror registries")?;
            *assigned_ips = assigned;
            Ok(())
        }
        BringUpStep::CreateCluster => {
            let config_path = ctx.out_dir.join(&ctx.spec.distribution_config);
            ctx.driver
                .create(&ctx.spec.cluster_name, &config_path)
                .await
                .context("creating cluster")?;
            Ok(())
        }
        BringUpStep::ConnectRegistries => {
            // Registries were already connected during SetupRegistries;
            // this step exists to preserve the ordering guarantee (connect
            // happens after cluster creation) for distributions where the
            // cluster's own network doesn't exist until `CreateCluster`
            // completes.
            Ok(())
        }
        BringUpStep::WaitReady => {
            if assigned_ips.is_empty() {
                return Ok(());
            }
            ctx.registry_backend
                .wait_for_registries_ready(assigned_ips, ctx.token.clone())
                .await
                .context("waiting for registries to become reachable")?;
            Ok(())
        }
        BringUpStep::InjectMirrors => {
            if ctx.spec.distribution == Distribution::Vanilla {
                // Vanilla's scaffolded kind.yaml already binds
                // `/etc/containerd/certs.d/<host>` via extraMounts, so
                // writing hosts.toml again at runtime would write into a
                // read-only bind mount.
                return Ok(());
            }
            let host_endpoints = build_host_endpoint_map(entries);
            let mirrors: Vec<HostsTomlContent> = entries
                .iter()
                .map(|entry| {
                    let endpoints = host_endpoints.get(&entry.host);
                    let remote = endpoints
                        .and_then(|e| e.last())
                        .cloned()
                        .unwrap_or_else(|| entry.remote.clone());
                    HostsTomlContent {
                        host: entry.host.clone(),
                        content: render_hosts_toml(&remote, &entry.endpoint),
                    }
                })
                .collect();
            let failures = ksail_injector::inject_mirrors_into_nodes(
                ctx.docker,
                ctx.spec.distribution,
                &ctx.spec.cluster_name,
                &mirrors,
            )
            .await
            .context("injecting mirror hosts.toml into cluster nodes")?;
            for (node, host, err) in &failures {
                warn!(node, host, %err, "failed to inject hosts.toml");
                ui::print_warning(&format!(
                    "failed to inject {host} into {node}: {err}"
                ));
            }
            Ok(())
        }
        BringUpStep::Installers => {
            if ctx.spec.csi == ksail_core::model::Csi::LocalPathProvisioner {
                installer::install_local_path_provisioner(
                    ctx.http_client,
                    &ctx.spec.resolved_context(),
                    ctx.installer_timeout,
                    ctx.token.clone(),
                )
                .await
                .context("installing local-path-provisioner")?;
            }
            if ctx.spec.metrics_server == MetricsServer::Enabled {
                info!("metrics-server enabled via distribution driver flags, no separate installer required");
            }
            Ok(())
        }
    }
}

/// Tear down a cluster: delete it via its driver, then clean up mirror
/// registry containers. Cleanup failures are warnings, not aborts.
pub async fn tear_down(
    driver: &dyn ClusterDriver,
    registry_backend: &dyn RegistryBackend,
    spec: &ClusterSpec,
    entries: &[MirrorEntry],
    network: &str,
    delete_volumes: bool,
) -> Result<()> {
    driver
        .delete(&spec.cluster_name)
        .await
        .context("deleting cluster")?;

    let mut warnings = Vec::new();
    cleanup_registries(registry_backend, entries, network, delete_volumes, &mut |w| {
        warnings.push(w);
    })
    .await;
    for warning in warnings {
        ui::print_warning(&warning);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_sequence_follows_ordering_guarantee() {
        let mut step = BringUpStep::NotStarted;
        let expected = [
            BringUpStep::Scaffold,
            BringUpStep::SetupRegistries,
            BringUpStep::CreateCluster,
            BringUpStep::ConnectRegistries,
            BringUpStep::WaitReady,
            BringUpStep::InjectMirrors,
            BringUpStep::Installers,
            BringUpStep::Complete,
        ];
        for want in expected {
            step = step.next();
            assert_eq!(step, want);
        }
        assert_eq!(step.next(), BringUpStep::Complete);
    }

    #[test]
    fn state_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = BringUpState::load(dir.path()).unwrap();
        assert_eq!(state.step, BringUpStep::NotStarted);
        state.advance(dir.path()).unwrap();
        assert_eq!(state.step, BringUpStep::Scaffold);

        let reloaded = BringUpState::load(dir.path()).unwrap();
        assert_eq!(reloaded.step, BringUpStep::Scaffold);
    }

    #[test]
    fn record_error_persists_message_and_increments_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = BringUpState::load(dir.path()).unwrap();
        state.record_error(dir.path(), "boom").unwrap();
        assert_eq!(state.attempt_count, 1);
        let reloaded = BringUpState::load(dir.path()).unwrap();
        assert_eq!(reloaded.last_error.as_deref(), Some("boom"));
    }
}
