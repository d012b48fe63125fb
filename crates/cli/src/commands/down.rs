//! `ksail down`: tear down a cluster and its mirror registries. Cleanup
//! failures are reported but don't abort the sequence, and a missing
//! cluster surfaces the driver's `ClusterNotFound` sentinel.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ksail_core::PortAllocator;
use ksail_registry::DockerRegistryBackend;

use crate::config;
use crate::network::resolved_network_name;
use crate::orchestrator::tear_down;
use crate::ui;

/// Tear down a cluster.
#[derive(Args, Debug)]
pub struct DownCommand {
    /// Output / config directory (where `ksail.yaml` was scaffolded).
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Cluster name override; defaults to the one recorded in
    /// `ksail.yaml`.
    #[arg(long)]
    cluster_name: Option<String>,

    /// Also delete the named volume backing each mirror registry.
    #[arg(long)]
    delete_volumes: bool,
}

impl DownCommand {
    /// Run the down command.
    ///
    /// # Errors
    ///
    /// Returns an error if no cluster spec can be resolved, Docker can't
    /// be reached, or the distribution driver fails to delete the
    /// cluster.
    pub async fn run(&self) -> Result<()> {
        ui::print_banner();
        ui::print_section("Tearing down cluster");

        let loaded = config::load_cluster_spec(&self.output_dir)?
            .context("no ksail.yaml found; nothing to tear down")?;
        let mut spec = loaded;
        if let Some(name) = &self.cluster_name {
            spec.cluster_name = name.clone();
        }

        let docker = crate::docker_client::connect()?;
        let registry_backend = DockerRegistryBackend::from_client(docker.clone());
        let driver = ksail_distro::build_driver(
            spec.distribution,
            spec.cluster_name.clone(),
            Some(docker.clone()),
        );

        let mut existing_hosts = HashSet::new();
        let mut ports = PortAllocator::default();
        let entries = ksail_mirror::build_mirror_entries(
            &spec.mirror_specs,
            &spec.cluster_name,
            &mut existing_hosts,
            &mut ports,
        );

        let network = resolved_network_name(spec.distribution, &spec.cluster_name);
        tear_down(
            driver.as_ref(),
            &registry_backend,
            &spec,
            &entries,
            &network,
            self.delete_volumes,
        )
        .await
        .context("tearing down cluster")?;

        let state_file = self.output_dir.join(".ksail").join("state.json");
        let _ = std::fs::remove_file(&state_file);

        ui::print_success(&format!("'{}' torn down", spec.cluster_name));
        Ok(())
    }
}
