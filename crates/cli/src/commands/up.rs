//! `ksail up`: the full seven-step bring-up sequence, delegating to
//! [`crate::orchestrator::run_bring_up`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use ksail_core::model::{Cni, Csi, Distribution, GitOpsEngine, LoadBalancer, MetricsServer};
use ksail_registry::DockerRegistryBackend;

use crate::config::{self, ClusterSpecOverlay};
use crate::network::{inspect_network_cidr, resolved_network_name};
use crate::orchestrator::{run_bring_up, BringUpContext};
use crate::ui;

/// Bring up a cluster.
#[derive(Args, Debug)]
pub struct UpCommand {
    /// Output / config directory.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long)]
    distribution: Option<Distribution>,
    #[arg(long)]
    cni: Option<Cni>,
    #[arg(long)]
    csi: Option<Csi>,
    #[arg(long)]
    metrics_server: Option<MetricsServer>,
    #[arg(long)]
    load_balancer: Option<LoadBalancer>,
    #[arg(long)]
    gitops_engine: Option<GitOpsEngine>,
    #[arg(long)]
    control_plane_count: Option<u8>,
    #[arg(long)]
    worker_count: Option<u8>,
    #[arg(long)]
    cluster_name: Option<String>,
    #[arg(long = "mirror")]
    mirrors: Vec<String>,

    /// Overwrite existing scaffolded files at the scaffold step.
    #[arg(long)]
    force: bool,

    /// Bound on installer operations (local-path-provisioner fetch +
    /// apply), defaulting to 5 minutes.
    #[arg(long, default_value = "300")]
    installer_timeout_secs: u64,

    /// Bound on the whole bring-up; unbounded by default.
    #[arg(long = "command-timeout")]
    command_timeout_secs: Option<u64>,
}

impl UpCommand {
    /// Run the up command.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec can't be resolved, Docker can't be
    /// reached, or any bring-up step fails.
    pub async fn run(&self) -> Result<()> {
        ui::print_banner();

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
            ..Default::default()
        };
        let spec = config::resolve_spec(existing, &overlay);

        let docker = crate::docker_client::connect()?;
        let registry_backend = DockerRegistryBackend::from_client(docker.clone());
        let driver = ksail_distro::build_driver(
            spec.distribution,
            spec.cluster_name.clone(),
            Some(docker.clone()),
        );

        let network = resolved_network_name(spec.distribution, &spec.cluster_name);
        let network_cidr = inspect_network_cidr(&docker, &network).await;

        let token = CancellationToken::new();
        let cancel_token = token.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel_token.cancel();
        });

        let root_token = if let Some(secs) = self.command_timeout_secs {
            let timeout_token = token.clone();
            let bound = Duration::from_secs(secs);
            tokio::spawn(async move {
                tokio::select! {
                    () = tokio::time::sleep(bound) => timeout_token.cancel(),
                    () = timeout_token.cancelled() => {}
                }
            });
            token
        } else {
            token
        };

        let http_client = reqwest::Client::new();
        let ctx = BringUpContext {
            out_dir: self.output_dir.clone(),
            spec,
            force: self.force,
            driver: driver.as_ref(),
            registry_backend: &registry_backend,
            docker: &docker,
            http_client: &http_client,
            network,
            network_cidr,
            installer_timeout: Duration::from_secs(self.installer_timeout_secs),
            token: root_token,
        };

        run_bring_up(ctx).await.context("bringing up cluster")
    }
}
