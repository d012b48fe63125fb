//! Classifying an update between two [`ClusterSpec`]s: structural changes
//! require a recreate, everything else is applied to the running
//! cluster's workload layer.

use ksail_core::model::ClusterSpec;

use crate::driver::UpdateResult;

/// Any change to topology, naming, mirror wiring, or the local-registry
/// toggle requires tearing the cluster down and recreating it; changes
/// confined to CNI/CSI/metrics-server/load-balancer/GitOps engine are
/// applied to the live cluster instead.
#[must_use]
pub fn classify_update(old: &ClusterSpec, new: &ClusterSpec) -> UpdateResult {
    let structural_changed = old.distribution != new.distribution
        || old.control_plane_count != new.control_plane_count
        || old.worker_count != new.worker_count
        || old.cluster_name != new.cluster_name
        || old.mirror_specs != new.mirror_specs
        || old.local_registry != new.local_registry;

    if structural_changed {
        return UpdateResult::RecreateRequired;
    }

    let live_changed = old.cni != new.cni
        || old.csi != new.csi
        || old.metrics_server != new.metrics_server
        || old.load_balancer != new.load_balancer
        || old.gitops_engine != new.gitops_engine;

    if live_changed {
        UpdateResult::AppliedLive
    } else {
        UpdateResult::NoChange
    }
}
