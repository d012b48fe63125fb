//! Side-table annotations for the command tree.
//!
//! clap's stable derive API has no generic annotation slot a tool-reflection
//! walk could read directly, so `consolidate=`, permission, and
//! "is this leaf actually runnable" are modeled as a small static map keyed
//! by command path, populated once at CLI startup, rather than invented
//! clap extension points.

use std::collections::HashMap;

use serde::Serialize;

/// Read/write split used when a consolidated parent has no explicit
/// permission of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Read,
    Write,
}

impl Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.suffix())
    }
}

impl Permission {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Everything the walk needs to know about one command node that clap's
/// tree can't tell it on its own.
#[derive(Debug, Clone, Default)]
pub struct CommandAnnotations {
    /// Whether this command has an execution function bound to it (the
    /// Rust equivalent of the source tree's `RunE` being non-nil). A
    /// pure grouping command (e.g. `ksail cluster`) leaves this `false`.
    pub executable: bool,
    /// `consolidate=<paramName>` — flattens every transitive runnable
    /// leaf beneath this command into one tool keyed by `paramName`.
    pub consolidate: Option<String>,
    /// This command's own read/write permission, when it has one
    /// explicitly (as opposed to inheriting a split from its leaves).
    pub permission: Option<Permission>,
    /// Skip this command and its whole subtree, regardless of clap's own
    /// `hide` flag — exclusion is a distinct concept from "hidden".
    pub excluded: bool,
}

impl CommandAnnotations {
    #[must_use]
    pub fn executable() -> Self {
        Self {
            executable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    #[must_use]
    pub fn with_consolidate(mut self, param_name: impl Into<String>) -> Self {
        self.consolidate = Some(param_name.into());
        self
    }

    #[must_use]
    pub fn excluded() -> Self {
        Self {
            excluded: true,
            ..Self::default()
        }
    }
}

/// Maps a full command path (e.g. `["cluster", "gen", "deployment"]`,
/// joined with a single space) to its annotations.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    entries: HashMap<String, CommandAnnotations>,
}

impl AnnotationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &[&str], annotations: CommandAnnotations) -> &mut Self {
        self.entries.insert(path_key(path), annotations);
        self
    }

    #[must_use]
    pub fn get(&self, path: &[String]) -> CommandAnnotations {
        let owned: Vec<&str> = path.iter().map(String::as_str).collect();
        self.entries.get(&path_key(&owned)).cloned().unwrap_or_default()
    }
}

/// Join a command path into the flat key used both for annotation lookup
/// and for the consolidated tool's leaf-name rendering: relative path
/// with `_` separators.
#[must_use]
pub fn path_key(path: &[&str]) -> String {
    path.join(" ")
}

/// Render a command path (relative to some ancestor) as the `_`-joined
/// leaf name the consolidated `subcommand` enum uses.
#[must_use]
pub fn relative_leaf_name(ancestor_depth: usize, full_path: &[String]) -> String {
    full_path[ancestor_depth..].join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trip() {
        let mut table = AnnotationTable::new();
        table.insert(&["cluster", "gen"], CommandAnnotations::executable().with_consolidate("resource_type"));
        let found = table.get(&["cluster".to_string(), "gen".to_string()]);
        assert!(found.executable);
        assert_eq!(found.consolidate.as_deref(), Some("resource_type"));
    }

    #[test]
    fn missing_path_yields_default() {
        let table = AnnotationTable::new();
        let found = table.get(&["nope".to_string()]);
        assert!(!found.executable);
        assert!(!found.excluded);
    }

    #[test]
    fn relative_leaf_name_strips_ancestor_prefix() {
        let path = vec!["cluster".to_string(), "gen".to_string(), "deployment".to_string()];
        assert_eq!(relative_leaf_name(2, &path), "deployment");
        let nested = vec![
            "cluster".to_string(),
            "gen".to_string(),
            "workload".to_string(),
            "kustomization".to_string(),
        ];
        assert_eq!(relative_leaf_name(2, &nested), "workload_kustomization");
    }
}
