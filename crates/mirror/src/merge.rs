//! Map-overlay merge of mirror spec sets, keyed by host.

use std::collections::BTreeMap;

use ksail_core::model::MirrorSpec;

/// Overlay `flags` onto `existing`, keyed by host — `flags` wins on
/// conflict — and emit a host-sorted slice for determinism.
///
/// `Merge(A, ∅) = sortByHost(A)`, `Merge(∅, B) = sortByHost(B)`.
#[must_use]
pub fn merge(existing: &[MirrorSpec], flags: &[MirrorSpec]) -> Vec<MirrorSpec> {
    let mut by_host: BTreeMap<String, MirrorSpec> = BTreeMap::new();
    for spec in existing {
        by_host.insert(spec.host.clone(), spec.clone());
    }
    for spec in flags {
        by_host.insert(spec.host.clone(), spec.clone());
    }
    by_host.into_values().collect()
}
