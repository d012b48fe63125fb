//! vCluster (virtual cluster) driver: delegates create/delete to the
//! `vcluster` CLI under a transient/D-Bus/fatal retry taxonomy.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ksail_core::model::ClusterSpec;
use ksail_core::KsailError;

use crate::diff::classify_update;
use crate::driver::{resolve_name, ClusterDriver, UpdateResult};
use crate::exec::run_streaming;

/// Total attempts a transient failure gets before giving up (2 retries
/// plus the initial attempt).
const MAX_TRANSIENT_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryClass {
    Transient,
    DBus,
    Fatal,
}

fn classify_error(message: &str) -> RetryClass {
    if message.contains("exit status 22") || message.contains("denied: denied") {
        RetryClass::Transient
    } else if message.contains("Failed to connect to bus") {
        RetryClass::DBus
    } else {
        RetryClass::Fatal
    }
}

/// Run `create_fn` under the retry taxonomy: a transient error (`exit
/// status 22`, `denied: denied`) gets cleanup, a short sleep, and a
/// retry, up to [`MAX_TRANSIENT_ATTEMPTS`] attempts total; a D-Bus
/// connection failure gets one cleanup-and-recovery-then-retry; anything
/// else is fatal and returns immediately. `cleanup_fn` only runs between
/// attempts that are about to retry — never on the call that ultimately
/// fails or succeeds — and its own errors are logged and swallowed.
pub async fn create_with_retry<F, Fut, C, CFut, R, RFut>(
    mut create_fn: F,
    mut cleanup_fn: C,
    mut dbus_recover_fn: R,
    token: &CancellationToken,
) -> Result<(), KsailError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), KsailError>>,
    C: FnMut() -> CFut,
    CFut: std::future::Future<Output = Result<(), KsailError>>,
    R: FnMut() -> RFut,
    RFut: std::future::Future<Output = Result<(), KsailError>>,
{
    let mut attempt: u32 = 0;
    let mut dbus_retried = false;

    loop {
        if token.is_cancelled() {
            return Err(KsailError::Cancelled {
                phase: "vcluster create".to_string(),
            });
        }
        attempt += 1;

        match create_fn().await {
            Ok(()) => return Ok(()),
            Err(err) => {
                let message = err.to_string();
                match classify_error(&message) {
                    RetryClass::Transient if attempt < MAX_TRANSIENT_ATTEMPTS => {
                        run_cleanup(&mut cleanup_fn).await;
                        wait_or_cancel(token).await?;
                    }
                    RetryClass::Transient => {
                        return Err(KsailError::Other(format!(
                            "vcluster create failed after {MAX_TRANSIENT_ATTEMPTS} attempts: {message}"
                        )));
                    }
                    RetryClass::DBus if !dbus_retried => {
                        dbus_retried = true;
                        run_cleanup(&mut cleanup_fn).await;
                        if let Err(recover_err) = dbus_recover_fn().await {
                            tracing::warn!("D-Bus recovery failed: {recover_err}");
                        }
                    }
                    RetryClass::DBus | RetryClass::Fatal => return Err(err),
                }
            }
        }
    }
}

async fn run_cleanup<C, CFut>(cleanup_fn: &mut C)
where
    C: FnMut() -> CFut,
    CFut: std::future::Future<Output = Result<(), KsailError>>,
{
    if let Err(err) = cleanup_fn().await {
        tracing::warn!("vcluster cleanup failed: {err}");
    }
}

async fn wait_or_cancel(token: &CancellationToken) -> Result<(), KsailError> {
    tokio::select! {
        () = tokio::time::sleep(RETRY_DELAY) => Ok(()),
        () = token.cancelled() => Err(KsailError::Cancelled { phase: "vcluster create".to_string() }),
    }
}

pub struct VClusterDriver {
    default_cluster_name: String,
}

impl VClusterDriver {
    #[must_use]
    pub fn new(default_cluster_name: impl Into<String>) -> Self {
        Self {
            default_cluster_name: default_cluster_name.into(),
        }
    }
}

#[async_trait]
impl ClusterDriver for VClusterDriver {
    async fn create(&self, name: &str, config_path: &Path) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name).to_string();
        let config_path = config_path.to_path_buf();
        let token = CancellationToken::new();

        create_with_retry(
            || {
                let name = name.clone();
                let config_path = config_path.clone();
                async move {
                    run_streaming(
                        "vcluster",
                        &[
                            "create",
                            &name,
                            "--config",
                            config_path.to_string_lossy().as_ref(),
                        ],
                    )
                    .await
                    .map(|_| ())
                }
            },
            || {
                let name = name.clone();
                async move { run_streaming("vcluster", &["delete", &name]).await.map(|_| ()) }
            },
            || async {
                run_streaming("systemctl", &["--user", "restart", "dbus"])
                    .await
                    .map(|_| ())
            },
            &token,
        )
        .await
    }

    async fn delete(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        if !self.exists(name).await? {
            return Err(KsailError::ClusterNotFound(name.to_string()));
        }
        run_streaming("vcluster", &["delete", name]).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        run_streaming("vcluster", &["resume", name]).await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), KsailError> {
        let name = resolve_name(name, &self.default_cluster_name);
        run_streaming("vcluster", &["pause", name]).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, KsailError> {
        let stdout = run_streaming("vcluster", &["list", "-o", "json"]).await?;
        parse_vcluster_list(&stdout)
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

#[derive(Debug, serde::Deserialize)]
struct VClusterListEntry {
    name: String,
}

fn parse_vcluster_list(stdout: &str) -> Result<Vec<String>, KsailError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<VClusterListEntry> = serde_json::from_str(trimmed)
        .map_err(|err| KsailError::Other(format!("parsing vcluster list: {err}")))?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}
