//! Executor-boundary validation for consolidated tool calls. Unknown
//! tools and unknown parameters are rejected at the executor boundary.
//!
//! This module only resolves *which* leaf a consolidated call targets and
//! checks its arguments against the descriptor's own schema; actually
//! dispatching into the CLI's command tree is `ksail-cli`'s job (it alone
//! knows how to turn a leaf path back into a runnable command).

use serde_json::{Map, Value};

use ksail_core::KsailError;

use crate::descriptor::ToolDescriptor;

/// The result of validating one tool call against its descriptor: the
/// resolved leaf command path (identical to `tool.command_path` for a
/// non-consolidated tool) and the caller-supplied arguments with the
/// `subcommand_param` key removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub leaf_relative_name: String,
    pub args: Map<String, Value>,
}

/// Validate one incoming tool call (`tool_name`, `args`) against its
/// descriptor. Enforces:
/// - the tool exists (caller's responsibility before calling this — this
///   function only validates the args for a *known* descriptor),
/// - every argument key is declared in the descriptor's `properties`,
/// - a consolidated tool's `subcommand_param` is present and names one of
///   `descriptor.subcommands`,
/// - any argument whose schema declares `type: "array"` is actually a
///   JSON array.
pub fn resolve_call(
    descriptor: &ToolDescriptor,
    mut args: Map<String, Value>,
) -> Result<ResolvedCall, KsailError> {
    reject_unknown_params(descriptor, &args)?;
    validate_array_typed_args(descriptor, &args)?;

    if !descriptor.is_consolidated {
        return Ok(ResolvedCall {
            leaf_relative_name: String::new(),
            args,
        });
    }

    let param = descriptor
        .subcommand_param
        .as_ref()
        .expect("consolidated tool always carries a subcommand_param");

    let value = args.remove(param).ok_or_else(|| KsailError::MissingSubcommandParam {
        tool: descriptor.name.clone(),
        param: param.clone(),
    })?;

    let leaf_name = value.as_str().ok_or_else(|| KsailError::InvalidSubcommand {
        tool: descriptor.name.clone(),
        value: value.to_string(),
    })?;

    let known = descriptor
        .subcommands
        .as_ref()
        .is_some_and(|subs| subs.iter().any(|s| s == leaf_name));
    if !known {
        return Err(KsailError::InvalidSubcommand {
            tool: descriptor.name.clone(),
            value: leaf_name.to_string(),
        });
    }

    Ok(ResolvedCall {
        leaf_relative_name: leaf_name.to_string(),
        args,
    })
}

/// Reject any argument key absent from `descriptor.parameters.properties`.
/// Unknown tools and unknown parameters are rejected at the executor
/// boundary per spec.md §6 — a schema-less descriptor (empty
/// `properties`) rejects every key outright.
fn reject_unknown_params(
    descriptor: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Result<(), KsailError> {
    let properties = descriptor
        .parameters
        .get("properties")
        .and_then(Value::as_object);
    for name in args.keys() {
        let known = properties.is_some_and(|props| props.contains_key(name));
        if !known {
            return Err(KsailError::UnknownParameter {
                tool: descriptor.name.clone(),
                param: name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_array_typed_args(
    descriptor: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Result<(), KsailError> {
    let Some(properties) = descriptor.parameters.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (name, value) in args {
        let schema = properties
            .get(name)
            .expect("reject_unknown_params already rejected args not in properties");
        if schema.get("type").and_then(Value::as_str) == Some("array") && !value.is_array() {
            return Err(KsailError::ArgsNotArray {
                tool: descriptor.name.clone(),
                arg: name.clone(),
            });
        }
    }
    Ok(())
}
