//! The `local-path-provisioner` CSI installer: an HTTP manifest fetch
//! followed by a `kubectl apply` invocation, the one piece of the bring-up
//! sequence that shells out to an external collaborator (`kubectl`) rather
//! than driving the Kubernetes API directly.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ksail_core::error::reqwest_error_shim;
use ksail_core::KsailError;

/// Upstream manifest for the most recent local-path-provisioner release
/// this workspace has validated against.
pub const LOCAL_PATH_PROVISIONER_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/rancher/local-path-provisioner/v0.0.30/deploy/local-path-storage.yaml";

/// Fetch the manifest at `url`, bounded by `timeout`.
pub async fn fetch_manifest(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    token: CancellationToken,
) -> Result<String, KsailError> {
    let request = client.get(url).timeout(timeout).send();
    tokio::select! {
        biased;
        () = token.cancelled() => Err(KsailError::Cancelled { phase: "manifest fetch".to_string() }),
        result = request => {
            let response = result.map_err(|e| KsailError::ManifestFetchFailed {
                url: url.to_string(),
                source: reqwest_error_shim::Error(e.to_string()),
            })?;
            let response = response.error_for_status().map_err(|e| KsailError::ManifestFetchFailed {
                url: url.to_string(),
                source: reqwest_error_shim::Error(e.to_string()),
            })?;
            response.text().await.map_err(|e| KsailError::ManifestFetchFailed {
                url: url.to_string(),
                source: reqwest_error_shim::Error(e.to_string()),
            })
        }
    }
}

/// Apply `manifest` with `kubectl apply -f -`, targeting `context`, piping
/// the manifest text over stdin so the content already fetched and
/// validated is exactly what gets applied — a transient re-GET can't race
/// the one already validated above.
pub async fn apply_manifest(manifest: &str, context: &str) -> Result<(), KsailError> {
    debug!(context, "applying manifest via kubectl");
    let mut child = Command::new("kubectl")
        .args(["--context", context, "apply", "-f", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| KsailError::Other(format!("spawning kubectl: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| KsailError::Other("kubectl stdin unavailable".to_string()))?;
    let manifest = manifest.to_string();
    let write_task = tokio::spawn(async move {
        let _ = stdin.write_all(manifest.as_bytes()).await;
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| KsailError::Other(format!("waiting for kubectl: {e}")))?;
    let _ = write_task.await;

    if !output.status.success() {
        return Err(KsailError::ExecFailed {
            code: i64::from(output.status.code().unwrap_or(-1)),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    info!("local-path-provisioner applied");
    Ok(())
}

/// Install `local-path-provisioner`: fetch then apply. No-op callers
/// check `ClusterSpec::csi` before calling this — the CSI choice gates
/// whether this installer runs at all.
pub async fn install_local_path_provisioner(
    client: &reqwest::Client,
    context: &str,
    timeout: Duration,
    token: CancellationToken,
) -> Result<(), KsailError> {
    let manifest = fetch_manifest(
        client,
        LOCAL_PATH_PROVISIONER_MANIFEST_URL,
        timeout,
        token,
    )
    .await?;
    apply_manifest(&manifest, context).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_manifest_reports_manifest_fetch_failed_on_connection_error() {
        let client = reqwest::Client::new();
        let err = fetch_manifest(
            &client,
            "http://127.0.0.1:1/unreachable",
            Duration::from_millis(200),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, KsailError::ManifestFetchFailed { .. }));
    }

    #[tokio::test]
    async fn fetch_manifest_honors_cancellation() {
        let client = reqwest::Client::new();
        let token = CancellationToken::new();
        token.cancel();
        let err = fetch_manifest(
            &client,
            "http://127.0.0.1:1/unreachable",
            Duration::from_secs(5),
            token,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, KsailError::Cancelled { .. }));
    }
}
