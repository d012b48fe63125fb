//! `ksail start`: start a stopped cluster's node containers, delegating
//! to the infrastructure provider acting on all labelled containers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config;
use crate::ui;

/// Start a stopped cluster.
#[derive(Args, Debug)]
pub struct StartCommand {
    /// Output / config directory (where `ksail.yaml` was scaffolded).
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Cluster name override; defaults to the one recorded in
    /// `ksail.yaml`.
    #[arg(long)]
    cluster_name: Option<String>,
}

impl StartCommand {
    /// Run the start command.
    ///
    /// # Errors
    ///
    /// Returns an error if no cluster spec can be resolved, Docker can't
    /// be reached, or the distribution driver fails to start the
    /// cluster's node containers.
    pub async fn run(&self) -> Result<()> {
        ui::print_banner();

        let mut spec = config::load_cluster_spec(&self.output_dir)?
            .context("no ksail.yaml found; run `ksail init` first")?;
        if let Some(name) = &self.cluster_name {
            spec.cluster_name = name.clone();
        }

        let docker = crate::docker_client::connect()?;
        let driver = ksail_distro::build_driver(
            spec.distribution,
            spec.cluster_name.clone(),
            Some(docker),
        );

        driver
            .start(&spec.cluster_name)
            .await
            .context("starting cluster")?;
        ui::print_success(&format!("'{}' started", spec.cluster_name));
        Ok(())
    }
}
