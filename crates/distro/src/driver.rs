//! The shared [`ClusterDriver`] surface every distribution adapter
//! implements, grounded on the Provider trait this workspace already
//! uses for infrastructure lifecycle (see `DESIGN.md`).

use std::path::Path;

use async_trait::async_trait;

use ksail_core::model::ClusterSpec;
use ksail_core::KsailError;

/// The outcome of reconciling a running cluster against a new spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// Nothing differed; no action taken.
    NoChange,
    /// Differences were confined to the live-applicable layer (CNI/CSI/
    /// metrics-server/load-balancer/GitOps choice) and were applied
    /// in place.
    AppliedLive,
    /// A structural field changed (topology, cluster name, mirrors,
    /// local-registry wiring); the caller must delete and recreate.
    RecreateRequired,
}

/// One back-end cluster lifecycle, implemented once per distribution.
///
/// `create` is handed the already-scaffolded distribution config path
/// (a file for Vanilla/K3s/vCluster, a directory tree for Talos); the
/// driver never regenerates config the scaffolder already wrote.
#[async_trait]
pub trait ClusterDriver: Send + Sync {
    async fn create(&self, name: &str, config_path: &Path) -> Result<(), KsailError>;
    async fn delete(&self, name: &str) -> Result<(), KsailError>;
    async fn start(&self, name: &str) -> Result<(), KsailError>;
    async fn stop(&self, name: &str) -> Result<(), KsailError>;
    async fn list(&self) -> Result<Vec<String>, KsailError>;

    /// Default: membership in [`ClusterDriver::list`]. Vanilla overrides
    /// this with its own sentinel-filtered listing.
    async fn exists(&self, name: &str) -> Result<bool, KsailError> {
        let clusters = self.list().await?;
        Ok(clusters.iter().any(|c| c == name))
    }

    async fn update(
        &self,
        name: &str,
        old: &ClusterSpec,
        new: &ClusterSpec,
    ) -> Result<UpdateResult, KsailError>;
}

/// An empty name argument resolves to the adapter's configured default.
#[must_use]
pub fn resolve_name<'a>(name: &'a str, default: &'a str) -> &'a str {
    if name.is_empty() {
        default
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_resolves_to_default() {
        assert_eq!(resolve_name("", "dev"), "dev");
        assert_eq!(resolve_name("prod", "dev"), "prod");
    }
}
