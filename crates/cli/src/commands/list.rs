//! List tables and the converters available to them.

use anyhow::Result;
use clap::Parser;
use console::style;

use super::DataArgs;
use crate::config::CliConfig;

/// List tables and registered converters
#[derive(Parser, Debug)]
pub struct List {
    #[command(flatten)]
    data: DataArgs,
}

impl List {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let content = self.data.load(config)?;

        println!("{}", style("Tables").bold());
        for name in content.table_names() {
            let pools = content.table(name).map_or(0, |table| table.pools().len());
            println!("  {} {}", style(name).cyan(), style(format!("({pools} pool(s))")).dim());
        }

        if let Some(catalog) = &content.catalog {
            println!();
            println!("{} {}", style("Items").bold(), style(format!("({})", catalog.len())).dim());
            for item in catalog.iter() {
                println!("  {}", item.id);
            }
        }

        let loader = &content.loader;
        let categories = [
            (loader.conditions().category(), loader.conditions().keys()),
            (loader.number_providers().category(), loader.number_providers().keys()),
            (loader.modifiers().category(), loader.modifiers().keys()),
            (loader.entries().category(), loader.entries().keys()),
        ];
        for (category, keys) in categories {
            println!();
            println!("{}", style(category).bold());
            println!("  {}", keys.join(", "));
        }
        Ok(())
    }
}
