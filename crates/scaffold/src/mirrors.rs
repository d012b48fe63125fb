//! Writing of `<mirrorsDir>/<host>/hosts.toml` files for the Vanilla
//! distribution.

use std::path::Path;

use anyhow::Result;

use ksail_mirror::{render_hosts_toml, MirrorEntry};

use crate::fsutil::{write_file, WriteOutcome};

/// Write one `hosts.toml` per entry, at `<mirrors_dir>/<host>/hosts.toml`.
/// The endpoint embedded points at the cluster-side hostname
/// (`http://<host>:5000`), matching the `extraMounts` binding the caller
/// wires up in `kind.yaml` — not the prefixed container-name endpoint
/// used for runtime injection.
pub fn write_mirror_hosts_toml_files(
    mirrors_dir: &Path,
    entries: &[MirrorEntry],
    force: bool,
) -> Result<Vec<(std::path::PathBuf, WriteOutcome)>> {
    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = mirrors_dir.join(&entry.host).join("hosts.toml");
        let scaffold_endpoint = format!("http://{}:5000", entry.host);
        let content = render_hosts_toml(&entry.remote, &scaffold_endpoint);
        let outcome = write_file(&path, &content, force)?;
        results.push((path, outcome));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(host: &str) -> MirrorEntry {
        MirrorEntry {
            host: host.to_string(),
            sanitized_name: host.replace('.', "-"),
            container_name: format!("kind-{}", host.replace('.', "-")),
            endpoint: format!("http://kind-{}:5000", host.replace('.', "-")),
            port: 5000,
            remote: format!("https://{host}"),
        }
    }

    #[test]
    fn writes_one_file_per_entry_at_host_path() {
        let dir = tempfile::tempdir().unwrap();
        let mirrors_dir = dir.path().join("kind/mirrors");
        let entries = vec![entry("docker.io"), entry("ghcr.io")];
        let results = write_mirror_hosts_toml_files(&mirrors_dir, &entries, false).unwrap();
        assert_eq!(results.len(), 2);
        for (path, outcome) in &results {
            assert_eq!(*outcome, WriteOutcome::Created);
            assert!(path.exists());
        }
        let content = std::fs::read_to_string(mirrors_dir.join("docker.io/hosts.toml")).unwrap();
        assert!(content.starts_with("server = \"https://docker.io\""));
        assert!(content.contains("http://docker.io:5000"));
    }
}
