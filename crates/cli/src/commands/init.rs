//! `ksail init`: materialise `ksail.yaml`, the distribution config, and
//! mirror side files on disk without creating anything.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ksail_core::model::{Cni, Csi, Distribution, GitOpsEngine, LoadBalancer, MetricsServer};
use ksail_core::PortAllocator;

use crate::config::{self, ClusterSpecOverlay};
use crate::ui;

/// Scaffold cluster config on disk.
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Output directory to scaffold into.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Distribution driver to scaffold for.
    #[arg(long)]
    distribution: Option<Distribution>,

    /// CNI choice.
    #[arg(long)]
    cni: Option<Cni>,

    /// CSI choice.
    #[arg(long)]
    csi: Option<Csi>,

    /// Metrics server toggle.
    #[arg(long)]
    metrics_server: Option<MetricsServer>,

    /// Load balancer provider choice.
    #[arg(long)]
    load_balancer: Option<LoadBalancer>,

    /// GitOps engine choice (never scaffolded as YAML; recorded for
    /// server-side bring-up).
    #[arg(long)]
    gitops_engine: Option<GitOpsEngine>,

    /// Control-plane node count.
    #[arg(long)]
    control_plane_count: Option<u8>,

    /// Worker node count.
    #[arg(long)]
    worker_count: Option<u8>,

    /// Cluster name override.
    #[arg(long)]
    cluster_name: Option<String>,

    /// Mirror specs in `[user:pass@]host[=endpoint]` form, repeatable.
    #[arg(long = "mirror")]
    mirrors: Vec<String>,

    /// kubectl context name override.
    #[arg(long)]
    context: Option<String>,

    /// Distribution config filename override.
    #[arg(long)]
    distribution_config: Option<String>,

    /// Workload manifest source directory.
    #[arg(long)]
    source_directory: Option<PathBuf>,

    /// Enable a driver-native local registry.
    #[arg(long)]
    local_registry: Option<bool>,

    /// Local registry host port.
    #[arg(long)]
    local_registry_port: Option<u16>,

    /// Overwrite existing scaffolded files.
    #[arg(long)]
    force: bool,
}

impl InitCommand {
    /// Run the init command.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec can't be loaded/resolved or the
    /// scaffolder fails to write any of its output files.
    pub async fn run(&self) -> Result<()> {
        ui::print_banner();
        ui::print_section("Scaffolding cluster config");

        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let existing = config::load_cluster_spec(&self.output_dir)?;
        let overlay = ClusterSpecOverlay {
            distribution: self.distribution,
            cni: self.cni,
            csi: self.csi,
            metrics_server: self.metrics_server,
            load_balancer: self.load_balancer,
            gitops_engine: self.gitops_engine,
            control_plane_count: self.control_plane_count,
            worker_count: self.worker_count,
            cluster_name: self.cluster_name.clone(),
            mirrors: if self.mirrors.is_empty() {
                None
            } else {
                Some(self.mirrors.clone())
            },
            context: self.context.clone(),
            distribution_config: self.distribution_config.clone(),
            source_directory: self.source_directory.clone(),
            local_registry_enabled: self.local_registry,
            local_registry_port: self.local_registry_port,
        };
        let spec = config::resolve_spec(existing, &overlay);

        let mut existing_hosts = HashSet::new();
        let mut ports = PortAllocator::default();
        let entries = ksail_mirror::build_mirror_entries(
            &spec.mirror_specs,
            &spec.cluster_name,
            &mut existing_hosts,
            &mut ports,
        );

        let report = ksail_scaffold::scaffold(&self.output_dir, &spec, &entries, self.force)
            .context("scaffolding cluster config")?;
        for notification in &report.notifications {
            ui::print_info(&notification.message);
        }
        ui::print_success(&format!(
            "scaffolded {} ({})",
            spec.cluster_name, spec.distribution
        ));
        Ok(())
    }
}
