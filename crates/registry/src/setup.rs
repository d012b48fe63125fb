//! The registry bring-up sequence and teardown cleanup.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use ksail_core::model::RegistryInfo;
use ksail_mirror::MirrorEntry;

use crate::backend::{RegistryBackend, RegistryCreateConfig, Result};
use crate::static_ip::allocate_high_end_ip;

/// Build the canonical [`RegistryInfo`] records the Backend operates on,
/// from derived mirror entries.
#[must_use]
pub fn registry_infos_from_entries(entries: &[MirrorEntry]) -> Vec<RegistryInfo> {
    entries
        .iter()
        .map(|entry| RegistryInfo {
            name: entry.container_name.clone(),
            host: entry.host.clone(),
            port: entry.port,
            endpoints: vec![entry.endpoint.clone()],
            upstream: entry.remote.clone(),
            volume: None,
        })
        .collect()
}

/// Bring up every mirror registry container for `entries`, connect it to
/// `network`, and wait until all are reachable before returning. When
/// `entries` is empty this is a no-op.
///
/// Step order: create, connect (with or without static IPs), then
/// wait-for-ready — mirroring the overall bring-up sequence's ordering
/// of cluster creation, registry connection, and readiness checks.
pub async fn setup_registries(
    backend: &dyn RegistryBackend,
    entries: &[MirrorEntry],
    network: &str,
    network_cidr: Option<&str>,
    use_static_ips: bool,
    labels: impl Fn(&MirrorEntry) -> HashMap<String, String>,
    token: CancellationToken,
) -> Result<Vec<IpAddr>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    for entry in entries {
        let cfg = RegistryCreateConfig {
            name: entry.container_name.clone(),
            upstream: entry.remote.clone(),
            labels: labels(entry),
            volume: None,
        };
        backend.create_registry(&cfg).await?;
    }

    let mut used_ips: std::collections::HashSet<Ipv4Addr> = std::collections::HashSet::new();
    let mut assigned = Vec::with_capacity(entries.len());
    for entry in entries {
        let static_ip = if use_static_ips {
            network_cidr.and_then(|cidr| {
                let ip = allocate_high_end_ip(cidr, &used_ips);
                if let Some(ip) = ip {
                    used_ips.insert(ip);
                }
                ip
            })
        } else {
            None
        };
        backend
            .connect_network(
                &entry.container_name,
                network,
                static_ip.map(IpAddr::V4),
            )
            .await?;
        if let Some(ip) = static_ip {
            assigned.push(IpAddr::V4(ip));
        }
    }

    if !assigned.is_empty() {
        backend
            .wait_for_registries_ready(&assigned, token)
            .await?;
    }

    Ok(assigned)
}

/// Tear down every registry container for `entries`. Each failure is
/// reported as a warning to `warn_sink` and does not abort teardown of
/// sibling registries.
pub async fn cleanup_registries(
    backend: &dyn RegistryBackend,
    entries: &[MirrorEntry],
    network: &str,
    delete_volumes: bool,
    warn_sink: &mut dyn FnMut(String),
) {
    for entry in entries {
        if let Err(err) = backend
            .delete_registry(&entry.container_name, Some(network), delete_volumes, None)
            .await
        {
            let message = format!(
                "failed to delete mirror registry {}: {err}",
                entry.container_name
            );
            warn!(%message);
            warn_sink(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::backend::RegistryBackendError;

    #[derive(Default)]
    struct FakeBackend {
        created: Mutex<Vec<String>>,
        connected: Mutex<Vec<(String, Option<IpAddr>)>>,
        deleted: Mutex<Vec<String>>,
        fail_create: bool,
    }

    #[async_trait]
    impl RegistryBackend for FakeBackend {
        async fn create_registry(&self, cfg: &RegistryCreateConfig) -> Result<()> {
            if self.fail_create {
                return Err(RegistryBackendError::Other("boom".into()));
            }
            self.created.lock().unwrap().push(cfg.name.clone());
            Ok(())
        }

        async fn delete_registry(
            &self,
            name: &str,
            _network: Option<&str>,
            _delete_volume: bool,
            _volume: Option<&str>,
        ) -> Result<()> {
            self.deleted.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn list_registries(
            &self,
            _label_filters: &HashMap<String, String>,
        ) -> Result<Vec<String>> {
            Ok(self.created.lock().unwrap().clone())
        }

        async fn get_registry_port(&self, _name: &str) -> Result<u16> {
            Ok(0)
        }

        async fn connect_network(
            &self,
            name: &str,
            _network: &str,
            static_ip: Option<IpAddr>,
        ) -> Result<()> {
            self.connected
                .lock()
                .unwrap()
                .push((name.to_string(), static_ip));
            Ok(())
        }

        async fn wait_for_registries_ready(
            &self,
            _ips: &[IpAddr],
            _token: CancellationToken,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn entry(host: &str, container: &str, port: u16) -> MirrorEntry {
        MirrorEntry {
            host: host.to_string(),
            sanitized_name: container.to_string(),
            container_name: container.to_string(),
            endpoint: format!("http://{container}:5000"),
            port,
            remote: format!("https://{host}"),
        }
    }

    #[tokio::test]
    async fn empty_entries_is_a_no_op() {
        let backend = FakeBackend::default();
        let result = setup_registries(
            &backend,
            &[],
            "kind",
            None,
            false,
            |_| HashMap::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(result.is_empty());
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creates_and_connects_each_entry() {
        let backend = FakeBackend::default();
        let entries = vec![entry("docker.io", "kind-docker-io", 5000)];
        setup_registries(
            &backend,
            &entries,
            "kind",
            Some("172.18.0.0/24"),
            true,
            |_| HashMap::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(backend.created.lock().unwrap().as_slice(), ["kind-docker-io"]);
        let connected = backend.connected.lock().unwrap();
        assert_eq!(connected.len(), 1);
        assert!(connected[0].1.is_some(), "static IP should be assigned");
    }

    #[tokio::test]
    async fn without_static_ips_connects_without_an_address() {
        let backend = FakeBackend::default();
        let entries = vec![entry("docker.io", "kind-docker-io", 5000)];
        setup_registries(
            &backend,
            &entries,
            "kind",
            Some("172.18.0.0/24"),
            false,
            |_| HashMap::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let connected = backend.connected.lock().unwrap();
        assert!(connected[0].1.is_none());
    }

    #[tokio::test]
    async fn cleanup_reports_errors_without_aborting_siblings() {
        let backend = FakeBackend {
            fail_create: false,
            ..Default::default()
        };
        let entries = vec![
            entry("docker.io", "kind-docker-io", 5000),
            entry("ghcr.io", "kind-ghcr-io", 5001),
        ];
        let mut warnings = Vec::new();
        cleanup_registries(&backend, &entries, "kind", true, &mut |w| warnings.push(w));
        assert_eq!(backend.deleted.lock().unwrap().len(), 2);
    }
}
