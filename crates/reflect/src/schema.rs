//! Flag -> JSON-schema type mapping.
//!
//! clap's stable API has no `reflect.Kind`-style dynamic type enum, so this
//! module consults the two pieces of introspection it does expose on
//! `clap::Arg`: [`clap::Arg::get_action`] (to catch boolean flags before
//! anything else) and [`clap::Arg::get_value_parser`]'s `AnyValueId`, plus
//! [`clap::Arg::get_possible_values`] for `ValueEnum`-backed flags.

use std::path::PathBuf;

use clap::builder::AnyValueId;
use clap::{Arg, ArgAction};
use serde_json::{json, Value};

/// A duration-typed flag's Rust representation in this workspace's own
/// command definitions (`--command-timeout 5m`, `--sync-timeout 30m`).
/// clap has no built-in duration parser; commands that want one register
/// `clap::value_parser!(DurationFlag)` against this marker type so the
/// reflection layer can recognise it by [`AnyValueId`] the same way it
/// recognises `String`/`i64`/`PathBuf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationFlag;

/// `DurationFlag::from_str` never actually fails (the value is only used
/// for its type identity in this reflection-focused workspace), but the
/// error still needs to satisfy clap's `value_parser!` bound.
#[derive(Debug)]
pub struct DurationParseError(String);

impl std::fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid duration: {}", self.0)
    }
}

impl std::error::Error for DurationParseError {}

impl std::str::FromStr for DurationFlag {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err(DurationParseError(s.to_string()))
        } else {
            Ok(Self)
        }
    }
}

/// Build the JSON-schema fragment for one flag:
/// bool -> boolean; integer families -> integer; float32/64 -> number;
/// string/array-of-string multi-value -> array<string>; array-of-integer
/// multi-value -> array<integer>; duration -> string with a format note
/// appended; `ValueEnum`-backed flags -> `{type: "string", enum: [...]}`;
/// anything else -> string. Default values are included unless the
/// default is literally `"false"` (bool) or `"[]"` (empty array).
#[must_use]
pub fn flag_schema(arg: &Arg) -> Value {
    if matches!(
        arg.get_action(),
        ArgAction::SetTrue | ArgAction::SetFalse | ArgAction::Count
    ) {
        let mut schema = json!({ "type": "boolean" });
        append_description(&mut schema, arg);
        append_default(&mut schema, arg, is_false_default);
        return schema;
    }

    let possible_values = arg.get_possible_values();
    if !possible_values.is_empty() {
        let names: Vec<Value> = possible_values
            .iter()
            .map(|p| Value::String(p.get_name().to_string()))
            .collect();
        let mut schema = json!({ "type": "string", "enum": names });
        append_description(&mut schema, arg);
        append_default(&mut schema, arg, |_| false);
        return schema;
    }

    let is_multi = arg.get_num_args().is_some_and(|n| n.max_values() > 1)
        || matches!(arg.get_action(), ArgAction::Append);

    let parser_type = arg.get_value_parser().type_id();
    let mut schema = if parser_type == AnyValueId::of::<DurationFlag>() {
        let mut s = json!({ "type": "string" });
        append_description(&mut s, arg);
        let desc = s
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let suffixed = if desc.is_empty() {
            "(format: 1h30m, 30s, 5m, …)".to_string()
        } else {
            format!("{desc} (format: 1h30m, 30s, 5m, …)")
        };
        s["description"] = Value::String(suffixed);
        append_default(&mut s, arg, |_| false);
        return s;
    } else if is_integer_type(parser_type) {
        if is_multi {
            json!({ "type": "array", "items": { "type": "integer" } })
        } else {
            json!({ "type": "integer" })
        }
    } else if is_float_type(parser_type) {
        json!({ "type": "number" })
    } else if is_multi {
        json!({ "type": "array", "items": { "type": "string" } })
    } else {
        json!({ "type": "string" })
    };

    append_description(&mut schema, arg);
    append_default(&mut schema, arg, is_empty_array_default);
    schema
}

fn is_integer_type(id: AnyValueId) -> bool {
    id == AnyValueId::of::<i8>()
        || id == AnyValueId::of::<i16>()
        || id == AnyValueId::of::<i32>()
        || id == AnyValueId::of::<i64>()
        || id == AnyValueId::of::<isize>()
        || id == AnyValueId::of::<u8>()
        || id == AnyValueId::of::<u16>()
        || id == AnyValueId::of::<u32>()
        || id == AnyValueId::of::<u64>()
        || id == AnyValueId::of::<usize>()
}

fn is_float_type(id: AnyValueId) -> bool {
    id == AnyValueId::of::<f32>() || id == AnyValueId::of::<f64>()
}

/// `true` for the "omit this default" case for bools.
fn is_false_default(default: &str) -> bool {
    default == "false"
}

/// `true` for the "omit this default" case for arrays.
fn is_empty_array_default(default: &str) -> bool {
    default == "[]"
}

fn append_description(schema: &mut Value, arg: &Arg) {
    if let Some(help) = arg.get_help() {
        schema["description"] = Value::String(help.to_string());
    }
}

fn append_default(schema: &mut Value, arg: &Arg, omit_if: impl Fn(&str) -> bool) {
    let defaults: Vec<String> = arg
        .get_default_values()
        .iter()
        .map(|v| v.to_string_lossy().to_string())
        .collect();
    if defaults.is_empty() {
        return;
    }
    let rendered = defaults.join(",");
    if omit_if(&rendered) {
        return;
    }
    schema["default"] = Value::String(rendered);
}

/// Whether `name` refers to clap's implicit `--help`/`-h` flag, which is
/// always excluded from generated schemas.
#[must_use]
pub fn is_help_flag(arg: &Arg) -> bool {
    arg.get_id() == "help"
}

/// Documents the one non-primitive parser type this module treats
/// specially beyond std's primitives (paths are rendered as plain
/// strings in the JSON schema, same as any other unrecognised type).
#[must_use]
pub fn path_type_id() -> AnyValueId {
    AnyValueId::of::<PathBuf>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{value_parser, Arg, ArgAction, Command};

    fn build(arg: Arg) -> Arg {
        let cmd = Command::new("t").arg(arg);
        cmd.get_arguments().find(|a| a.get_id() != "help").unwrap().clone()
    }

    #[test]
    fn bool_flag_maps_to_boolean_and_omits_false_default() {
        let arg = build(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .default_value("false"),
        );
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "boolean");
        assert!(schema.get("default").is_none());
    }

    #[test]
    fn bool_flag_with_true_default_keeps_default() {
        let arg = build(
            Arg::new("enable_vlan")
                .long("enable-vlan")
                .action(ArgAction::SetTrue)
                .default_value("true"),
        );
        let schema = flag_schema(&arg);
        assert_eq!(schema["default"], "true");
    }

    #[test]
    fn integer_flag_maps_to_integer() {
        let arg = build(Arg::new("nodes").long("nodes").value_parser(value_parser!(u8)));
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "integer");
    }

    #[test]
    fn float_flag_maps_to_number() {
        let arg = build(Arg::new("ratio").long("ratio").value_parser(value_parser!(f64)));
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "number");
    }

    #[test]
    fn multi_valued_string_maps_to_array_of_string() {
        let arg = build(
            Arg::new("mirrors")
                .long("mirrors")
                .action(ArgAction::Append)
                .value_parser(value_parser!(String)),
        );
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["type"], "string");
    }

    #[test]
    fn empty_array_default_is_omitted() {
        let arg = build(
            Arg::new("mirrors")
                .long("mirrors")
                .action(ArgAction::Append)
                .value_parser(value_parser!(String))
                .default_value("[]"),
        );
        let schema = flag_schema(&arg);
        assert!(schema.get("default").is_none());
    }

    #[test]
    fn possible_values_become_string_enum() {
        let arg = build(
            Arg::new("distribution")
                .long("distribution")
                .value_parser(["vanilla", "k3s", "talos", "vcluster"]),
        );
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "string");
        assert_eq!(schema["enum"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn duration_flag_appends_format_note() {
        let arg = build(
            Arg::new("command_timeout")
                .long("command-timeout")
                .help("Overall command timeout")
                .value_parser(value_parser!(DurationFlag)),
        );
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "string");
        assert!(schema["description"].as_str().unwrap().contains("format: 1h30m"));
    }

    #[test]
    fn unknown_type_falls_back_to_string() {
        let arg = build(Arg::new("name").long("name"));
        let schema = flag_schema(&arg);
        assert_eq!(schema["type"], "string");
    }

    #[test]
    fn help_flag_is_identified() {
        let cmd = Command::new("t").arg(Arg::new("name").long("name"));
        let help = cmd.get_arguments().find(|a| a.get_id() == "help").unwrap();
        assert!(is_help_flag(help));
    }
}
