//! Derivation of per-distribution [`MirrorEntry`] records from parsed
//! [`MirrorSpec`]s, and the host -> endpoint-list map K3d's mirror config
//! needs.

use std::collections::{BTreeMap, HashSet};

use ksail_core::model::MirrorSpec;
use ksail_core::sanitize::sanitize_host;
use ksail_core::PortAllocator;

use crate::parse::default_remote_for;

/// A derived, per-cluster record for one mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    pub host: String,
    pub sanitized_name: String,
    pub container_name: String,
    pub endpoint: String,
    pub port: u16,
    pub remote: String,
}

impl MirrorEntry {
    /// Every mirror container listens on 5000 internally.
    pub const INTERNAL_PORT: u16 = 5000;
}

/// Given parsed specs, an optional container-name prefix (e.g. the cluster
/// name, to avoid Docker DNS collisions across clusters), an in-out
/// `existing_hosts` dedup set, and a port allocator, produce the derived
/// entries. Hosts already present in `existing_hosts` are skipped (and not
/// reinserted); newly produced entries' hosts are added to the set.
pub fn build_mirror_entries(
    specs: &[MirrorSpec],
    container_prefix: &str,
    existing_hosts: &mut HashSet<String>,
    ports: &mut PortAllocator,
) -> Vec<MirrorEntry> {
    let mut entries = Vec::new();
    for spec in specs {
        if existing_hosts.contains(&spec.host) {
            continue;
        }
        let sanitized_name = sanitize_host(&spec.host);
        let container_name = if container_prefix.is_empty() {
            sanitized_name.clone()
        } else {
            format!("{container_prefix}-{sanitized_name}")
        };
        let port = ports.allocate();
        let entry = MirrorEntry {
            host: spec.host.clone(),
            sanitized_name,
            container_name: container_name.clone(),
            endpoint: format!("http://{container_name}:{}", MirrorEntry::INTERNAL_PORT),
            port,
            remote: spec.remote.clone(),
        };
        existing_hosts.insert(spec.host.clone());
        entries.push(entry);
    }
    entries
}

/// Compose a `host -> [endpoint...]` map suitable for K3d's mirror config.
/// For each entry the local (in-cluster) endpoint is prepended, then the
/// upstream remote; duplicates are removed by case-insensitive trimmed
/// equality. When an entry would otherwise end up with no endpoints, a
/// single generated upstream URL is synthesised from its host.
#[must_use]
pub fn build_host_endpoint_map(entries: &[MirrorEntry]) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let mut endpoints: Vec<String> = Vec::new();
        for candidate in [entry.endpoint.as_str(), entry.remote.as_str()] {
            let trimmed = candidate.trim();
            if trimmed.is_empty() {
                continue;
            }
            let already_present = endpoints
                .iter()
                .any(|e: &String| e.trim().eq_ignore_ascii_case(trimmed));
            if !already_present {
                endpoints.push(trimmed.to_string());
            }
        }
        if endpoints.is_empty() {
            endpoints.push(default_remote_for(&entry.host));
        }
        map.insert(entry.host.clone(), endpoints);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(host: &str, remote: &str) -> MirrorSpec {
        MirrorSpec {
            host: host.to_string(),
            remote: remote.to_string(),
            username: None,
            password: None,
        }
    }

    #[test]
    fn build_entries_allocates_sequential_ports_and_prefixes_names() {
        let specs = vec![spec("docker.io", "https://registry-1.docker.io")];
        let mut existing = HashSet::new();
        let mut ports = PortAllocator::default();
        let entries = build_mirror_entries(&specs, "kind", &mut existing, &mut ports);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].container_name, "kind-docker-io");
        assert_eq!(entries[0].endpoint, "http://kind-docker-io:5000");
        assert_eq!(entries[0].port, 5000);
    }

    #[test]
    fn build_entries_skips_hosts_already_seen() {
        let specs = vec![
            spec("docker.io", "https://registry-1.docker.io"),
            spec("ghcr.io", "https://ghcr.io"),
        ];
        let mut existing: HashSet<String> = ["docker.io".to_string()].into_iter().collect();
        let mut ports = PortAllocator::default();
        let entries = build_mirror_entries(&specs, "", &mut existing, &mut ports);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "ghcr.io");
    }

    #[test]
    fn no_prefix_uses_sanitized_host_directly() {
        let specs = vec![spec("docker.io", "https://registry-1.docker.io")];
        let mut existing = HashSet::new();
        let mut ports = PortAllocator::default();
        let entries = build_mirror_entries(&specs, "", &mut existing, &mut ports);
        assert_eq!(entries[0].container_name, "docker-io");
    }

    #[test]
    fn host_endpoint_map_prepends_local_then_upstream() {
        let mut existing = HashSet::new();
        let mut ports = PortAllocator::default();
        let entries = build_mirror_entries(
            &[spec("docker.io", "https://registry-1.docker.io")],
            "kind",
            &mut existing,
            &mut ports,
        );
        let map = build_host_endpoint_map(&entries);
        assert_eq!(
            map.get("docker.io").unwrap(),
            &vec![
                "http://kind-docker-io:5000".to_string(),
                "https://registry-1.docker.io".to_string(),
            ]
        );
    }

    #[test]
    fn host_endpoint_map_dedups_case_insensitively() {
        let entry = MirrorEntry {
            host: "docker.io".into(),
            sanitized_name: "docker-io".into(),
            container_name: "kind-docker-io".into(),
            endpoint: "HTTP://SAME.EXAMPLE.COM:5000".into(),
            port: 5000,
            remote: "http://same.example.com:5000".into(),
        };
        let map = build_host_endpoint_map(std::slice::from_ref(&entry));
        assert_eq!(map.get("docker.io").unwrap().len(), 1);
    }
}
