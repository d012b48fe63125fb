//! Injection of `hosts.toml` into a node container via a single shell exec.

use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use futures::StreamExt;
use tracing::{debug, info};

use crate::delimiter::random_delimiter;
use crate::escape::shell_single_quote;
use crate::InjectorError;

/// Build the shell command that writes `content` to
/// `/etc/containerd/certs.d/<host>/hosts.toml` inside a node container,
/// using a freshly generated heredoc delimiter so attacker-controlled
/// file content can never terminate the heredoc early.
#[must_use]
pub fn build_injection_command(certs_dir: &str, content: &str) -> String {
    let delimiter = random_delimiter();
    let quoted_dir = shell_single_quote(certs_dir);
    format!(
        "mkdir -p {quoted_dir} && cat > {quoted_dir}/hosts.toml << '{delimiter}'\n{content}\n{delimiter}\n"
    )
}

/// Exec the injection command inside `container_id`, demuxing stdout and
/// stderr, and returning [`InjectorError::ExecFailed`] on a non-zero exit.
pub async fn inject_hosts_toml(
    docker: &Docker,
    container_id: &str,
    host: &str,
    content: &str,
) -> Result<(), InjectorError> {
    let certs_dir = format!("/etc/containerd/certs.d/{host}");
    let command = build_injection_command(&certs_dir, content);

    let exec = docker
        .create_exec(
            container_id,
            CreateExecOptions {
                cmd: Some(vec!["sh".to_string(), "-c".to_string(), command]),
                attach_stdout: Some(true),
                attach_stderr: Some(true),
                ..Default::default()
            },
        )
        .await?;

    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();

    if let StartExecResults::Attached { mut output, .. } =
        docker.start_exec(&exec.id, None).await?
    {
        while let Some(chunk) = output.next().await {
            match chunk? {
                bollard::container::LogOutput::StdOut { message } => {
                    stdout_buf.push_str(&String::from_utf8_lossy(&message));
                }
                bollard::container::LogOutput::StdErr { message } => {
                    stderr_buf.push_str(&String::from_utf8_lossy(&message));
                }
                _ => {}
            }
        }
    }

    let inspect = docker.inspect_exec(&exec.id).await?;
    let exit_code = inspect.exit_code.unwrap_or(0);
    if exit_code != 0 {
        return Err(InjectorError::ExecFailed {
            code: exit_code,
            stderr: stderr_buf,
        });
    }

    debug!(container_id, host, stdout = %stdout_buf, "injected hosts.toml");
    info!(container_id, host, "hosts.toml injected into node");
    Ok(())
}
