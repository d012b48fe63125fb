//! Rendering of Talos `v1alpha1` machine config mirror patches.
//!
//! Produces a patch populating `machine.registries.mirrors[<host>].endpoints`.
//! Critically, no TLS block is ever attached here: containerd in Talos
//! rejects a TLS config on a non-HTTPS endpoint, and this patch shape has
//! no field to carry one in the first place.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
struct RegistryMirror {
    endpoints: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MachineRegistries {
    mirrors: BTreeMap<String, RegistryMirror>,
}

#[derive(Debug, Serialize)]
struct Machine {
    registries: MachineRegistries,
}

#[derive(Debug, Serialize)]
struct TalosMirrorPatch {
    machine: Machine,
}

/// Render a Talos machine config patch YAML document for the given
/// host -> endpoints map.
///
/// # Errors
///
/// Returns an error only if YAML serialisation itself fails, which does
/// not happen for this struct shape in practice.
pub fn render_talos_mirror_patch(
    map: &BTreeMap<String, Vec<String>>,
) -> Result<String, serde_yaml::Error> {
    let mirrors = map
        .iter()
        .map(|(host, endpoints)| {
            (
                host.clone(),
                RegistryMirror {
                    endpoints: endpoints.clone(),
                },
            )
        })
        .collect();
    let patch = TalosMirrorPatch {
        machine: Machine {
            registries: MachineRegistries { mirrors },
        },
    };
    serde_yaml::to_string(&patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_mirrors_map_under_machine_registries() {
        let mut map = BTreeMap::new();
        map.insert(
            "docker.io".to_string(),
            vec!["http://kind-docker-io:5000".to_string()],
        );
        let rendered = render_talos_mirror_patch(&map).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        let endpoints = value["machine"]["registries"]["mirrors"]["docker.io"]["endpoints"]
            .as_sequence()
            .unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].as_str().unwrap(), "http://kind-docker-io:5000");
    }

    #[test]
    fn never_emits_a_tls_block() {
        let mut map = BTreeMap::new();
        map.insert(
            "docker.io".to_string(),
            vec!["http://kind-docker-io:5000".to_string()],
        );
        let rendered = render_talos_mirror_patch(&map).unwrap();
        assert!(!rendered.contains("tls"));
    }
}
