//! The `ToolDescriptor` shape consumed by an AI invocation protocol.

use serde::Serialize;
use serde_json::Value;

use crate::annotations::Permission;

/// One tool exposed to an AI invocation surface: either a single leaf
/// command, or a consolidation of several sibling leaves behind one
/// enumerated `subcommand` parameter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// A JSON Schema draft-7 object.
    pub parameters: Value,
    /// The space-joined command path this tool was generated from, e.g.
    /// `"cluster gen deployment"`.
    pub command_path: String,
    pub command_parts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_permission: Option<Permission>,
    pub is_consolidated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommands: Option<Vec<String>>,
}
