//! Rendering of the K3d `mirrors:` YAML sub-document embedded in
//! `Registries.Config`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::parse::default_remote_for;

/// Render the deterministic, host-sorted K3d mirror config block.
///
/// `map` is expected to already carry a non-empty endpoint list per host
/// (see [`crate::entries::build_host_endpoint_map`]); an empty list still
/// falls back to a generated upstream URL so the output is always total.
#[must_use]
pub fn render_k3d_mirror_config(map: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::from("mirrors:\n");
    for (host, endpoints) in map {
        let _ = writeln!(out, "  \"{host}\":");
        out.push_str("    endpoint:\n");
        if endpoints.is_empty() {
            let _ = writeln!(out, "      - {}", default_remote_for(host));
        } else {
            for endpoint in endpoints {
                let _ = writeln!(out, "      - {endpoint}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_exact_expected_lines() {
        let mut map = BTreeMap::new();
        map.insert(
            "docker.io".to_string(),
            vec![
                "http://kind-docker.io:5000".to_string(),
                "https://registry-1.docker.io".to_string(),
            ],
        );
        let rendered = render_k3d_mirror_config(&map);
        let expected = "mirrors:\n  \"docker.io\":\n    endpoint:\n      - http://kind-docker.io:5000\n      - https://registry-1.docker.io\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn hosts_sorted_deterministically() {
        let mut map = BTreeMap::new();
        map.insert("zeta.io".to_string(), vec!["https://zeta.io".to_string()]);
        map.insert("alpha.io".to_string(), vec!["https://alpha.io".to_string()]);
        let rendered = render_k3d_mirror_config(&map);
        let alpha_pos = rendered.find("alpha.io").unwrap();
        let zeta_pos = rendered.find("zeta.io").unwrap();
        assert!(alpha_pos < zeta_pos);
    }

    #[test]
    fn empty_endpoint_list_falls_back_to_generated_upstream() {
        let mut map = BTreeMap::new();
        map.insert("docker.io".to_string(), vec![]);
        let rendered = render_k3d_mirror_config(&map);
        assert!(rendered.contains("https://registry-1.docker.io"));
    }
}
