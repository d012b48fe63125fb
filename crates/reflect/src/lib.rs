//! Tool-Reflection Surface: walks a `clap::Command` tree into JSON-schema
//! tool descriptors for an AI invocation protocol.
//!
//! This crate is the one component with no direct precedent elsewhere in
//! this workspace's own crates: its closest relative is a hand-written
//! tool-schema module that builds descriptors by hand rather than walking
//! a command tree (see `DESIGN.md`). The walk itself is modeled fresh on
//! `clap::Command`'s reflective API; the descriptor *output* follows that
//! module's `serde_json::json!`-construction style.

pub mod annotations;
pub mod descriptor;
pub mod executor;
pub mod schema;
pub mod walk;

pub use annotations::{AnnotationTable, CommandAnnotations, Permission};
pub use descriptor::ToolDescriptor;
pub use executor::{resolve_call, ResolvedCall};
pub use walk::generate_tools;
