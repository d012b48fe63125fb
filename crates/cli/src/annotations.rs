//! The static annotation table matching this binary's own command tree,
//! feeding `ksail-reflect`'s tool-reflection walk. Clap's stable derive
//! API has no slot for "is this runnable", "what permission does it
//! require", or "consolidate these leaves"; this table supplies them out
//! of band, keyed by command path.

use ksail_reflect::{AnnotationTable, CommandAnnotations, Permission};

/// Build the annotation table for `ksail`'s command tree.
///
/// `tools` itself is excluded: it is the introspection surface, not a
/// cluster operation, so reflecting it into its own tool descriptor would
/// be circular.
#[must_use]
pub fn build() -> AnnotationTable {
    let mut table = AnnotationTable::new();
    table.insert(
        &["ksail", "init"],
        CommandAnnotations::executable().with_permission(Permission::Write),
    );
    table.insert(
        &["ksail", "up"],
        CommandAnnotations::executable().with_permission(Permission::Write),
    );
    table.insert(
        &["ksail", "down"],
        CommandAnnotations::executable().with_permission(Permission::Write),
    );
    table.insert(
        &["ksail", "start"],
        CommandAnnotations::executable().with_permission(Permission::Write),
    );
    table.insert(
        &["ksail", "stop"],
        CommandAnnotations::executable().with_permission(Permission::Write),
    );
    table.insert(
        &["ksail", "list"],
        CommandAnnotations::executable().with_permission(Permission::Read),
    );
    table.insert(&["ksail", "tools"], CommandAnnotations::excluded());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_read_permission() {
        let table = build();
        let ann = table.get(&["ksail".to_string(), "list".to_string()]);
        assert!(ann.executable);
        assert_eq!(ann.permission, Some(Permission::Read));
    }

    #[test]
    fn tools_is_excluded() {
        let table = build();
        let ann = table.get(&["ksail".to_string(), "tools".to_string()]);
        assert!(ann.excluded);
    }
}
