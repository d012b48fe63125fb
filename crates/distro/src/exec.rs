//! Shelling out to the upstream distribution CLIs (`kind`, `k3d`,
//! `talosctl`, `vcluster`).
//!
//! Every adapter funnels through [`run_streaming`]: stdout is streamed at
//! info level as it arrives, stderr is captured for the error path, and
//! both reader tasks are joined before the child is reaped so a slow
//! final stderr flush can never race the exit status.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use ksail_core::KsailError;

/// Run `program args...`, streaming stdout lines at info and stderr lines
/// at debug. Returns captured stdout on success. A non-zero exit becomes
/// [`KsailError::ExecFailed`] carrying the exit code and captured stderr.
pub async fn run_streaming(program: &str, args: &[&str]) -> Result<String, KsailError> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| KsailError::Other(format!("failed to spawn {program}: {err}")))?;

    let stdout = child
        .stdout
        .take()
        .expect("stdout was requested as piped");
    let stderr = child
        .stderr
        .take()
        .expect("stderr was requested as piped");

    let stdout_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        let mut collected = String::new();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::info!("{line}");
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    });
    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        let mut collected = String::new();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!("{line}");
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    });

    let stdout_text = stdout_task.await.unwrap_or_default();
    let stderr_text = stderr_task.await.unwrap_or_default();

    let status = child
        .wait()
        .await
        .map_err(|err| KsailError::Other(format!("failed to wait for {program}: {err}")))?;

    if !status.success() {
        return Err(KsailError::ExecFailed {
            code: i64::from(status.code().unwrap_or(-1)),
            stderr: stderr_text,
        });
    }
    Ok(stdout_text)
}
