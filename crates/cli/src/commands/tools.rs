//! `ksail tools`: emit the AI tool-reflection catalogue for this binary's
//! own command tree.

use anyhow::{Context, Result};
use clap::Args;

use crate::annotations;

/// Print the JSON tool-reflection catalogue.
#[derive(Args, Debug)]
pub struct ToolsCommand {
    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = true)]
    pretty: bool,
}

impl ToolsCommand {
    /// Run the tools command.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated catalogue fails to serialize.
    pub fn run(&self) -> Result<()> {
        let root = crate::cli_command();
        let table = annotations::build();
        let tools = ksail_reflect::generate_tools(&root, &table);

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&tools)
        } else {
            serde_json::to_string(&tools)
        }
        .context("serializing tool catalogue")?;
        println!("{rendered}");
        Ok(())
    }
}
