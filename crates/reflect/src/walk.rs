//! The command-tree walk: consolidation, permission splitting, and
//! flag-merging rules, modeled as a post-order traversal.

use std::collections::{BTreeSet, HashMap};

use clap::Command;
use serde_json::{json, Value};

use crate::annotations::{relative_leaf_name, AnnotationTable, CommandAnnotations, Permission};
use crate::descriptor::ToolDescriptor;
use crate::schema::{flag_schema, is_help_flag};

/// A runnable leaf discovered beneath a consolidating parent, with its
/// path relative to that parent (used to build the `subcommand` enum
/// value) and its own read/write permission, if it carries one.
struct Leaf<'a> {
    relative_name: String,
    command: &'a Command,
    permission: Option<Permission>,
}

/// Walk `root` and produce every tool descriptor for its command tree.
///
/// `root` is the CLI's own top-level `clap::Command` (typically
/// `Cli::command()`); `annotations` is the static side-table populated at
/// startup (see [`crate::annotations`]).
#[must_use]
pub fn generate_tools(root: &Command, annotations: &AnnotationTable) -> Vec<ToolDescriptor> {
    let mut out = Vec::new();
    walk_node(root, &[], annotations, &mut out);
    out
}

fn walk_node(
    cmd: &Command,
    parent_path: &[String],
    annotations: &AnnotationTable,
    out: &mut Vec<ToolDescriptor>,
) {
    if cmd.is_hide_set() {
        return;
    }

    let mut full_path = parent_path.to_vec();
    full_path.push(cmd.get_name().to_string());

    let ann = annotations.get(&full_path);
    if ann.excluded {
        return;
    }

    if let Some(param_name) = ann.consolidate.clone() {
        let depth = full_path.len();
        let leaves = collect_runnable_leaves(cmd, &full_path, depth, annotations);
        if leaves.is_empty() {
            return;
        }
        emit_consolidated(cmd, &full_path, &param_name, &leaves, ann.permission, out);
        // A consolidated branch's leaves are fully represented by the
        // tool(s) just emitted; do not also walk them individually.
        return;
    }

    if is_runnable(cmd, &ann) {
        out.push(build_leaf_tool(cmd, &full_path, ann.permission));
    }

    for child in cmd.get_subcommands() {
        walk_node(child, &full_path, annotations, out);
    }
}

/// A command is runnable iff it has an execution function and either no
/// children or at least one non-help flag (group commands that only call
/// Help are skipped).
fn is_runnable(cmd: &Command, ann: &CommandAnnotations) -> bool {
    if !ann.executable {
        return false;
    }
    let has_children = cmd.get_subcommands().next().is_some();
    if !has_children {
        return true;
    }
    cmd.get_arguments().any(|a| !is_help_flag(a))
}

fn collect_runnable_leaves<'a>(
    cmd: &'a Command,
    path: &[String],
    ancestor_depth: usize,
    annotations: &AnnotationTable,
) -> Vec<Leaf<'a>> {
    let mut leaves = Vec::new();
    collect_runnable_leaves_inner(cmd, path, ancestor_depth, annotations, &mut leaves);
    leaves
}

fn collect_runnable_leaves_inner<'a>(
    cmd: &'a Command,
    path: &[String],
    ancestor_depth: usize,
    annotations: &AnnotationTable,
    out: &mut Vec<Leaf<'a>>,
) {
    if cmd.is_hide_set() {
        return;
    }
    let ann = annotations.get(path);
    if ann.excluded {
        return;
    }
    if is_runnable(cmd, &ann) {
        out.push(Leaf {
            relative_name: relative_leaf_name(ancestor_depth, path),
            command: cmd,
            permission: ann.permission,
        });
    }
    for child in cmd.get_subcommands() {
        let mut child_path = path.to_vec();
        child_path.push(child.get_name().to_string());
        collect_runnable_leaves_inner(child, &child_path, ancestor_depth, annotations, out);
    }
}

/// Build the consolidated tool(s) for one `consolidate=` parent. If the
/// parent has an explicit permission, leaves inherit it and a single tool
/// is emitted; otherwise leaves are split by their own permission
/// annotation into up to two tools (`<name>_read`, `<name>_write`).
fn emit_consolidated(
    cmd: &Command,
    full_path: &[String],
    param_name: &str,
    leaves: &[Leaf<'_>],
    parent_permission: Option<Permission>,
    out: &mut Vec<ToolDescriptor>,
) {
    let base_name = full_path.join("_");

    if parent_permission.is_some() {
        out.push(build_consolidated_tool(
            cmd,
            full_path,
            &base_name,
            param_name,
            leaves,
            parent_permission,
        ));
        return;
    }

    let read_leaves: Vec<&Leaf<'_>> = leaves
        .iter()
        .filter(|l| l.permission != Some(Permission::Write))
        .collect();
    let write_leaves: Vec<&Leaf<'_>> = leaves
        .iter()
        .filter(|l| l.permission == Some(Permission::Write))
        .collect();

    if !read_leaves.is_empty() {
        let refs: Vec<Leaf<'_>> = read_leaves
            .iter()
            .map(|l| Leaf {
                relative_name: l.relative_name.clone(),
                command: l.command,
                permission: l.permission,
            })
            .collect();
        out.push(build_consolidated_tool(
            cmd,
            full_path,
            &format!("{base_name}_read"),
            param_name,
            &refs,
            Some(Permission::Read),
        ));
    }
    if !write_leaves.is_empty() {
        let refs: Vec<Leaf<'_>> = write_leaves
            .iter()
            .map(|l| Leaf {
                relative_name: l.relative_name.clone(),
                command: l.command,
                permission: l.permission,
            })
            .collect();
        out.push(build_consolidated_tool(
            cmd,
            full_path,
            &format!("{base_name}_write"),
            param_name,
            &refs,
            Some(Permission::Write),
        ));
    }
}

fn build_consolidated_tool(
    cmd: &Command,
    full_path: &[String],
    tool_name: &str,
    param_name: &str,
    leaves: &[Leaf<'_>],
    permission: Option<Permission>,
) -> ToolDescriptor {
    let mut subcommand_names: Vec<String> = leaves.iter().map(|l| l.relative_name.clone()).collect();
    subcommand_names.sort();

    let mut properties = serde_json::Map::new();
    properties.insert(
        param_name.to_string(),
        json!({
            "type": "string",
            "enum": subcommand_names,
            "description": format!("Which {} subcommand to invoke.", cmd.get_name()),
        }),
    );

    // Merge every leaf's flags. A flag present on only a subset of
    // leaves gets an "applies to: ..." suffix on its description.
    let mut flag_leaf_names: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut flag_schemas: HashMap<String, Value> = HashMap::new();
    let mut flag_required_everywhere: HashMap<String, bool> = HashMap::new();

    for leaf in leaves {
        for arg in leaf.command.get_arguments() {
            if is_help_flag(arg) {
                continue;
            }
            let key = arg.get_id().to_string();
            flag_leaf_names
                .entry(key.clone())
                .or_default()
                .insert(leaf.relative_name.clone());
            flag_schemas.entry(key.clone()).or_insert_with(|| flag_schema(arg));
            let required_here = arg.is_required_set();
            flag_required_everywhere
                .entry(key)
                .and_modify(|r| *r = *r && required_here)
                .or_insert(required_here);
        }
    }

    let total_leaves = leaves.len();
    for (flag_name, leaf_names) in &flag_leaf_names {
        let mut schema = flag_schemas.get(flag_name).cloned().unwrap_or(json!({"type": "string"}));
        if leaf_names.len() < total_leaves {
            let applies_to = leaf_names.iter().cloned().collect::<Vec<_>>().join(", ");
            let suffix = format!("(applies to: {applies_to})");
            let desc = schema
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default();
            let merged = if desc.is_empty() {
                suffix
            } else {
                format!("{desc} {suffix}")
            };
            schema["description"] = Value::String(merged);
        }
        properties.insert(flag_name.clone(), schema);
    }

    let mut required = vec![param_name.to_string()];
    for (flag_name, always_required) in &flag_required_everywhere {
        if *always_required {
            required.push(flag_name.clone());
        }
    }
    required.sort();

    let parameters = json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    });

    ToolDescriptor {
        name: tool_name.to_string(),
        description: cmd
            .get_about()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Operations under {}.", full_path.join(" "))),
        parameters,
        command_path: full_path.join(" "),
        command_parts: full_path.to_vec(),
        requires_permission: permission,
        is_consolidated: true,
        subcommand_param: Some(param_name.to_string()),
        subcommands: Some(subcommand_names),
    }
}

fn build_leaf_tool(
    cmd: &Command,
    full_path: &[String],
    permission: Option<Permission>,
) -> ToolDescriptor {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for arg in cmd.get_arguments() {
        if is_help_flag(arg) {
            continue;
        }
        let id = arg.get_id().to_string();
        if arg.is_required_set() {
            required.push(id.clone());
        }
        properties.insert(id, flag_schema(arg));
    }
    required.sort();

    let parameters = json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    });

    ToolDescriptor {
        name: full_path.join("_"),
        description: cmd
            .get_about()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        parameters,
        command_path: full_path.join(" "),
        command_parts: full_path.to_vec(),
        requires_permission: permission,
        is_consolidated: false,
        subcommand_param: None,
        subcommands: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Arg;

    use crate::annotations::CommandAnnotations;

    fn cluster_cli() -> Command {
        Command::new("ksail")
            .subcommand(
                Command::new("up")
                    .about("Create and bring up a cluster")
                    .arg(Arg::new("distribution").long("distribution")),
            )
            .subcommand(
                Command::new("down")
                    .about("Tear down a cluster")
                    .arg(Arg::new("delete_volumes").long("delete-volumes").action(clap::ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("list")
                    .about("List clusters")
                    .arg(Arg::new("all").long("all").action(clap::ArgAction::SetTrue)),
            )
            .subcommand(Command::new("version").about("Print version"))
    }

    #[test]
    fn simple_leaves_produce_one_tool_each() {
        let cli = Command::new("ksail")
            .subcommand(
                Command::new("version")
                    .about("prints version"),
            );
        let mut table = AnnotationTable::new();
        table.insert(&["ksail", "version"], CommandAnnotations::executable());
        let tools = generate_tools(&cli, &table);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "ksail_version");
        assert!(!tools[0].is_consolidated);
    }

    #[test]
    fn group_command_without_non_help_flags_is_skipped() {
        let cli = cluster_cli();
        let mut table = AnnotationTable::new();
        // `ksail` itself is a pure group: no executable annotation set.
        table.insert(&["ksail", "up"], CommandAnnotations::executable());
        table.insert(&["ksail", "down"], CommandAnnotations::executable());
        table.insert(&["ksail", "list"], CommandAnnotations::executable());
        table.insert(&["ksail", "version"], CommandAnnotations::executable());
        let tools = generate_tools(&cli, &table);
        assert_eq!(tools.len(), 4);
        assert!(tools.iter().all(|t| t.command_parts[0] == "ksail"));
    }

    #[test]
    fn consolidate_with_explicit_permission_emits_one_tool() {
        let cli = Command::new("ksail").subcommand(
            Command::new("gen")
                .about("Generate resources")
                .subcommand(Command::new("deployment").about("Generate a Deployment"))
                .subcommand(Command::new("service").about("Generate a Service"))
                .subcommand(Command::new("configmap").about("Generate a ConfigMap")),
        );
        let mut table = AnnotationTable::new();
        table.insert(
            &["ksail", "gen"],
            CommandAnnotations::executable()
                .with_consolidate("resource_type")
                .with_permission(Permission::Write),
        );
        table.insert(&["ksail", "gen", "deployment"], CommandAnnotations::executable());
        table.insert(&["ksail", "gen", "service"], CommandAnnotations::executable());
        table.insert(&["ksail", "gen", "configmap"], CommandAnnotations::executable());

        let tools = generate_tools(&cli, &table);
        assert_eq!(tools.len(), 1);
        let tool = &tools[0];
        assert!(tool.is_consolidated);
        assert_eq!(tool.subcommand_param.as_deref(), Some("resource_type"));
        let enum_values = tool.parameters["properties"]["resource_type"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(enum_values.len(), 3);
    }

    #[test]
    fn consolidate_without_permission_splits_read_write() {
        let cli = Command::new("ksail").subcommand(
            Command::new("secret")
                .about("Secret operations")
                .subcommand(Command::new("get").about("Read a secret"))
                .subcommand(Command::new("set").about("Write a secret")),
        );
        let mut table = AnnotationTable::new();
        table.insert(
            &["ksail", "secret"],
            CommandAnnotations::executable().with_consolidate("op"),
        );
        table.insert(
            &["ksail", "secret", "get"],
            CommandAnnotations::executable().with_permission(Permission::Read),
        );
        table.insert(
            &["ksail", "secret", "set"],
            CommandAnnotations::executable().with_permission(Permission::Write),
        );

        let tools = generate_tools(&cli, &table);
        assert_eq!(tools.len(), 2);
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"ksail_secret_read"));
        assert!(names.contains(&"ksail_secret_write"));
    }

    #[test]
    fn excluded_command_never_appears() {
        let cli = cluster_cli();
        let mut table = AnnotationTable::new();
        table.insert(&["ksail", "up"], CommandAnnotations::executable());
        table.insert(&["ksail", "down"], CommandAnnotations::excluded());
        let tools = generate_tools(&cli, &table);
        assert!(tools.iter().all(|t| t.name != "ksail_down"));
    }

    #[test]
    fn subset_flag_gets_applies_to_suffix() {
        let cli = Command::new("ksail").subcommand(
            Command::new("gen")
                .about("Generate resources")
                .subcommand(
                    Command::new("deployment")
                        .about("Generate a Deployment")
                        .arg(Arg::new("replicas").long("replicas").value_parser(clap::value_parser!(u32))),
                )
                .subcommand(Command::new("configmap").about("Generate a ConfigMap")),
        );
        let mut table = AnnotationTable::new();
        table.insert(
            &["ksail", "gen"],
            CommandAnnotations::executable()
                .with_consolidate("resource_type")
                .with_permission(Permission::Write),
        );
        table.insert(&["ksail", "gen", "deployment"], CommandAnnotations::executable());
        table.insert(&["ksail", "gen", "configmap"], CommandAnnotations::executable());

        let tools = generate_tools(&cli, &table);
        let tool = &tools[0];
        let desc = tool.parameters["properties"]["replicas"]["description"]
            .as_str()
            .unwrap();
        assert!(desc.contains("applies to: deployment"));
    }

    #[test]
    fn consolidate_with_no_runnable_leaves_emits_nothing() {
        let cli = Command::new("ksail").subcommand(
            Command::new("gen").about("Generate resources"),
        );
        let mut table = AnnotationTable::new();
        table.insert(
            &["ksail", "gen"],
            CommandAnnotations::executable().with_consolidate("resource_type"),
        );
        let tools = generate_tools(&cli, &table);
        assert!(tools.is_empty());
    }
}
