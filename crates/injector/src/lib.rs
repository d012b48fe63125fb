//! Containerd Injector: once cluster nodes exist, writes
//! `/etc/containerd/certs.d/<host>/hosts.toml` into each via a Docker exec
//! channel, using safe shell quoting and a randomised heredoc delimiter.

pub mod delimiter;
pub mod discovery;
pub mod error;
pub mod escape;
pub mod exec;

pub use delimiter::random_delimiter;
pub use discovery::{discover_nodes, NodeContainer};
pub use error::InjectorError;
pub use escape::shell_single_quote;
pub use exec::{build_injection_command, inject_hosts_toml};

use std::sync::Arc;

use bollard::Docker;
use ksail_core::model::Distribution;
use tokio::sync::Semaphore;

/// Bound on concurrent host injections per node.
const MAX_CONCURRENT_HOSTS: usize = 4;

/// One mirror's rendered `hosts.toml` content, keyed by registry host.
#[derive(Debug, Clone)]
pub struct HostsTomlContent {
    pub host: String,
    pub content: String,
}

/// Inject every `(host, hosts.toml content)` pair into every discovered
/// node of `cluster`. Injection is sequential per node, for simpler
/// error semantics; different hosts for the same node run concurrently,
/// bounded by a small worker pool.
///
/// Returns the list of `(node name, host)` pairs that failed, paired with
/// their error, so the caller can decide whether a partial failure is
/// fatal for the overall bring-up.
pub async fn inject_mirrors_into_nodes(
    docker: &Docker,
    distribution: Distribution,
    cluster: &str,
    mirrors: &[HostsTomlContent],
) -> Result<Vec<(String, String, InjectorError)>, InjectorError> {
    if mirrors.is_empty() {
        return Ok(Vec::new());
    }

    let nodes = discover_nodes(docker, distribution, cluster).await?;
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_HOSTS));
    let mut failures = Vec::new();

    for node in nodes {
        let mut tasks = Vec::with_capacity(mirrors.len());
        for mirror in mirrors {
            let permit = Arc::clone(&semaphore);
            let docker = docker.clone();
            let node_id = node.id.clone();
            let node_name = node.name.clone();
            let host = mirror.host.clone();
            let content = mirror.content.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                let result = inject_hosts_toml(&docker, &node_id, &host, &content).await;
                (node_name, host, result)
            }));
        }
        for task in tasks {
            if let (node_name, host, Err(err)) = task.await.expect("injection task panicked") {
                failures.push((node_name, host, err));
            }
        }
    }

    Ok(failures)
}
