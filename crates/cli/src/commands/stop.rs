//! `ksail stop`: stop a running cluster's node containers, the
//! counterpart of `ksail start` on the same shared infrastructure rule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config;
use crate::ui;

/// Stop a running cluster.
#[derive(Args, Debug)]
pub struct StopCommand {
    /// Output / config directory (where `ksail.yaml` was scaffolded).
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Cluster name override; defaults to the one recorded in
    /// `ksail.yaml`.
    #[arg(long)]
    cluster_name: Option<String>,
}

impl StopCommand {
    /// Run the stop command.
    ///
    /// # Errors
    ///
    /// Returns an error if no cluster spec can be resolved, Docker can't
    /// be reached, or the distribution driver fails to stop the
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
            .stop(&spec.cluster_name)
            .await
            .context("stopping cluster")?;
        ui::print_success(&format!("'{}' stopped", spec.cluster_name));
        Ok(())
    }
}
