//! Vanilla (Kind-style) cluster driver: shells out to the `kind` binary.

use std::path::Path;

use async_trait::async_trait;
use bollard::Docker;

use ksail_core::model::{ClusterSpec, Distribution};
use ksail_core::KsailError;

use crate::diff::classify_update;
use crate::docker_lifecycle::{start_nodes, stop_nodes};
use crate::driver::{resolve_name, ClusterDriver, UpdateResult};
use crate::exec::run_streaming;

/// The sentinel line `kind get clusters` prints instead of an empty list.
const NO_CLUSTERS_SENTINEL: &str = "No clusters found.";

pub struct VanillaDriver {
    default_cluster_name: String,
    docker: Option<Docker>,
}

impl VanillaDriver {
    #[must_use]
    pub fn new(default_cluster_name: impl Into<String>, docker: Option<Docker>) -> Self {
        Self {
            default_cluster_name: default_cluster_name.into(),
            docker,
        }
    }
}

#[async_trait]
impl ClusterDriver for VanillaDriver {
    async fn create(&self, name: &str, config_path: &Path) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        run_streaming(
            "kind",
            &[
                "create",
                "cluster",
                "--name",
                name,
                "--config",
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
        run_streaming("kind", &["delete", "cluster", "--name", name]).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        start_nodes(self.docker.as_ref(), Distribution::Vanilla, name).await
    }

    async fn stop(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        stop_nodes(self.docker.as_ref(), Distribution::Vanilla, name).await
    }

    async fn list(&self) -> Result<Vec<String>, KsailError> {
        let stdout = run_streaming("kind", &["get", "clusters"]).await?;
        Ok(parse_cluster_list(&stdout))
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

/// `kind get clusters` prints one name per line, or the literal sentinel
/// `"No clusters found."` when there are none — filtered out here rather
/// than treated as a cluster named that.
fn parse_cluster_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != NO_CLUSTERS_SENTINEL)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_cluster_list() {
        let out = "dev\nstaging\n";
        assert_eq!(parse_cluster_list(out), vec!["dev", "staging"]);
    }

    #[test]
    fn filters_no_clusters_sentinel() {
        let out = "No clusters found.\n";
        assert!(parse_cluster_list(out).is_empty());
    }
}
