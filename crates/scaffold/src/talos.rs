//! Materialisation of the Talos patch tree: `talos/{cluster,control-planes,workers}/`.
//!
//! Conditional cluster-scope patches are emitted by name; any of the
//! three subdirectories that ends up with no patch still gets a
//! `.gitkeep` so the directory itself is tracked.

use ksail_core::model::ClusterSpec;
use ksail_mirror::{build_host_endpoint_map, render_talos_mirror_patch, MirrorEntry};

/// One file to be written under `talos/<scope-dir>/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalosPatchFile {
    pub scope_dir: &'static str,
    pub filename: &'static str,
    pub content: String,
}

const CLUSTER_DIR: &str = "cluster";
const CONTROL_PLANES_DIR: &str = "control-planes";
const WORKERS_DIR: &str = "workers";

/// Build the conditional cluster-scope patch files plus `.gitkeep`
/// placeholders for any of the three scope directories that receives no
/// patch.
#[must_use]
pub fn build_talos_patch_tree(spec: &ClusterSpec, entries: &[MirrorEntry]) -> Vec<TalosPatchFile> {
    let mut files = Vec::new();

    if spec.worker_count == 0 {
        files.push(TalosPatchFile {
            scope_dir: CLUSTER_DIR,
            filename: "allow-scheduling-on-control-planes.yaml",
            content: allow_scheduling_patch(),
        });
    }

    if !entries.is_empty() {
        let map = build_host_endpoint_map(entries);
        let content = render_talos_mirror_patch(&map)
            .expect("talos mirror patch struct serialises without error");
        files.push(TalosPatchFile {
            scope_dir: CLUSTER_DIR,
            filename: "mirror-registries.yaml",
            content,
        });
    }

    if matches!(spec.cni, ksail_core::model::Cni::Cilium | ksail_core::model::Cni::Calico) {
        files.push(TalosPatchFile {
            scope_dir: CLUSTER_DIR,
            filename: "disable-default-cni.yaml",
            content: disable_default_cni_patch(),
        });
    }

    files.push(TalosPatchFile {
        scope_dir: CLUSTER_DIR,
        filename: "kubelet-cert-rotation.yaml",
        content: kubelet_cert_rotation_patch(),
    });
    files.push(TalosPatchFile {
        scope_dir: CLUSTER_DIR,
        filename: "kubelet-csr-approver.yaml",
        content: kubelet_csr_approver_patch(),
    });
    files.push(TalosPatchFile {
        scope_dir: CLUSTER_DIR,
        filename: "cluster-name.yaml",
        content: cluster_name_patch(&spec.cluster_name),
    });

    for dir in [CLUSTER_DIR, CONTROL_PLANES_DIR, WORKERS_DIR] {
        if !files.iter().any(|f| f.scope_dir == dir) {
            files.push(TalosPatchFile {
                scope_dir: dir,
                filename: ".gitkeep",
                content: String::new(),
            });
        }
    }

    files
}

fn allow_scheduling_patch() -> String {
    "cluster:\n  allowSchedulingOnControlPlanes: true\n".to_string()
}

fn disable_default_cni_patch() -> String {
    "cluster:\n  network:\n    cni:\n      name: none\n".to_string()
}

fn kubelet_cert_rotation_patch() -> String {
    "machine:\n  kubelet:\n    extraArgs:\n      rotate-server-certificates: \"true\"\n".to_string()
}

fn kubelet_csr_approver_patch() -> String {
    "cluster:\n  extraManifests:\n    - https://raw.githubusercontent.com/alex1989hu/kubelet-serving-cert-approver/main/deploy/standalone-install.yaml\n".to_string()
}

fn cluster_name_patch(cluster_name: &str) -> String {
    format!("cluster:\n  clusterName: {cluster_name}\n")
}
