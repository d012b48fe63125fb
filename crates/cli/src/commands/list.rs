//! `ksail list`: list clusters for the configured distribution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ksail_core::model::Distribution;

use crate::config;
use crate::ui;

/// List clusters.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output / config directory (where `ksail.yaml` was scaffolded).
    /// Only consulted when `--distribution` is not given.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Distribution to list; defaults to the one recorded in
    /// `ksail.yaml` if present, else `vanilla`.
    #[arg(long)]
    distribution: Option<Distribution>,
}

impl ListCommand {
    /// Run the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if Docker can't be reached or the distribution
    /// driver's own list invocation fails.
    pub async fn run(&self) -> Result<()> {
        let distribution = match self.distribution {
            Some(d) => d,
            None => config::load_cluster_spec(&self.output_dir)?
                .map_or(Distribution::default(), |spec| spec.distribution),
        };

        let docker = crate::docker_client::connect()?;
        let driver = ksail_distro::build_driver(distribution, String::new(), Some(docker));

        let clusters = driver.list().await.context("listing clusters")?;
        if clusters.is_empty() {
            ui::print_info(&format!("no {distribution} clusters found"));
            return Ok(());
        }
        for name in clusters {
            ui::print_list_item(&name);
        }
        Ok(())
    }
}
