//! Print a table in canonical form.

use anyhow::Result;
use clap::Parser;

use super::{DataArgs, find_table};
use crate::config::CliConfig;

/// Print a table in canonical JSON form
#[derive(Parser, Debug)]
pub struct Dump {
    /// Table name (file stem under the tables directory)
    #[arg(value_name = "TABLE")]
    table: String,

    #[command(flatten)]
    data: DataArgs,

    /// Single-line output
    #[arg(long)]
    compact: bool,
}

impl Dump {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let content = self.data.load(config)?;
        let table = find_table(&content, &self.table)?;
        let ctx = content.conversion_context()?;

        let node = table.serialize(&ctx)?;
        let text = if self.compact {
            serde_json::to_string(&node)?
        } else {
            serde_json::to_string_pretty(&node)?
        };
        println!("{text}");
        Ok(())
    }
}
