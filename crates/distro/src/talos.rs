//! Talos Linux (in Docker) cluster driver: shells out to `talosctl`.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::Docker;

use ksail_core::model::{ClusterSpec, Distribution};
use ksail_core::KsailError;

/// The label ksail-applied node containers carry, matching
/// `ksail-injector`'s discovery scheme for Talos.
const TALOS_CLUSTER_LABEL: &str = "ksail.io/talos-cluster";

use crate::diff::classify_update;
use crate::docker_lifecycle::{start_nodes, stop_nodes};
use crate::driver::{resolve_name, ClusterDriver, UpdateResult};
use crate::exec::run_streaming;
use crate::talos_config::validate_configs;

pub struct TalosDriver {
    default_cluster_name: String,
    docker: Option<Docker>,
}

impl TalosDriver {
    #[must_use]
    pub fn new(default_cluster_name: impl Into<String>, docker: Option<Docker>) -> Self {
        Self {
            default_cluster_name: default_cluster_name.into(),
            docker,
        }
    }
}

#[async_trait]
impl ClusterDriver for TalosDriver {
    async fn create(&self, name: &str, config_path: &Path) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        validate_configs(config_path)?;
        run_streaming(
            "talosctl",
            &[
                "cluster",
                "create",
                "--name",
                name,
                "--config-patch-dir",
                config_path.to_string_lossy().as_ref(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        if !self.exists(name).await? {
            return Err(KsailError::ClusterNotFound(name.to_string()));
        }
        run_streaming("talosctl", &["cluster", "destroy", "--name", name]).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        start_nodes(self.docker.as_ref(), Distribution::Talos, name).await
    }

    async fn stop(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        stop_nodes(self.docker.as_ref(), Distribution::Talos, name).await
    }

    /// `talosctl` has no single "list every cluster" verb, so Docker-level
    /// discovery — the same label scheme `ksail-injector` uses to find
    /// node containers — is the source of truth instead.
    async fn list(&self) -> Result<Vec<String>, KsailError> {
        let docker = self.docker.as_ref().ok_or(KsailError::ProviderNotSet)?;
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        filters.insert("label".to_string(), vec![TALOS_CLUSTER_LABEL.to_string()]);
        let summaries = docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters,
                ..Default::default()
            }))
            .await
            .map_err(|err| KsailError::Other(err.to_string()))?;

        let mut names: Vec<String> = summaries
            .into_iter()
            .filter_map(|summary| summary.labels?.get(TALOS_CLUSTER_LABEL).cloned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn update(
        &self,
        _name: &str,
        old: &ClusterSpec,
        new: &ClusterSpec,
    ) -> Result<UpdateResult, KsailError> {
        Ok(classify_update(old, new))
    }
}
