//! K3s (K3d-in-Docker) cluster driver: shells out to the `k3d` binary.

use std::path::Path;

use async_trait::async_trait;
use bollard::Docker;
use serde::Deserialize;

use ksail_core::model::{ClusterSpec, Distribution};
use ksail_core::KsailError;

use crate::diff::classify_update;
use crate::docker_lifecycle::{start_nodes, stop_nodes};
use crate::driver::{resolve_name, ClusterDriver, UpdateResult};
use crate::exec::run_streaming;

pub struct K3sDriver {
    default_cluster_name: String,
    docker: Option<Docker>,
}

impl K3sDriver {
    #[must_use]
    pub fn new(default_cluster_name: impl Into<String>, docker: Option<Docker>) -> Self {
        Self {
            default_cluster_name: default_cluster_name.into(),
            docker,
        }
    }
}

#[async_trait]
impl ClusterDriver for K3sDriver {
    async fn create(&self, name: &str, config_path: &Path) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        run_streaming(
            "k3d",
            &[
                "cluster",
                "create",
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
        run_streaming("k3d", &["cluster", "delete", name]).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        start_nodes(self.docker.as_ref(), Distribution::K3s, name).await
    }

    async fn stop(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        stop_nodes(self.docker.as_ref(), Distribution::K3s, name).await
    }

    async fn list(&self) -> Result<Vec<String>, KsailError> {
        let stdout = run_streaming("k3d", &["cluster", "list", "-o", "json"]).await?;
        parse_cluster_list(&stdout)
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

#[derive(Debug, Deserialize)]
struct K3dClusterListEntry {
    name: String,
}

fn parse_cluster_list(stdout: &str) -> Result<Vec<String>, KsailError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<K3dClusterListEntry> = serde_json::from_str(trimmed)
        .map_err(|err| KsailError::Other(format!("parsing k3d cluster list: {err}")))?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_k3d_json_list() {
        let out = r#"[{"name":"dev","nodes":[]},{"name":"staging","nodes":[]}]"#;
        assert_eq!(parse_cluster_list(out).unwrap(), vec!["dev", "staging"]);
    }

    #[test]
    fn empty_list_output_is_no_clusters() {
        assert!(parse_cluster_list("[]").unwrap().is_empty());
    }
}
