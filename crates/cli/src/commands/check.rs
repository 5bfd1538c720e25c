//! Validate every loot table in a data directory.
//!
//! Each table is loaded on its own so one broken file does not hide the
//! others, then serialized, read back and serialized again; both canonical
//! forms must match.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use console::style;
use loot_content::loaders::conversion_context;
use loot_content::{ItemStack, TableLoader, configured_loader};
use loot_core::{ConversionContext, LootTable};
use tracing::debug;

use super::DataArgs;
use crate::config::CliConfig;

/// Load every table and verify it survives a canonical round trip
#[derive(Parser, Debug)]
pub struct Check {
    #[command(flatten)]
    data: DataArgs,
}

impl Check {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let factory = self.data.factory(config);
        let loot_config = factory.load_config()?;
        let catalog = factory.load_items(&loot_config)?.map(Arc::new);
        let loader = configured_loader(&loot_config)?;

        let ctx = conversion_context(&loader, catalog.as_ref())?;

        let paths = TableLoader::discover(&factory.tables_dir(&loot_config))?;
        println!(
            "{} {} table(s) in {}",
            style("Checking").bold(),
            paths.len(),
            style(factory.data_dir().display()).dim()
        );

        let mut failures = 0usize;
        for path in &paths {
            let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
            debug!(path = %path.display(), "checking table");
            match TableLoader::load(path, &ctx).and_then(|table| round_trip(&table, &ctx)) {
                Ok(()) => println!("  {} {}", style("✓").green(), name),
                Err(e) => {
                    failures += 1;
                    println!("  {} {}", style("✗").red().bold(), name);
                    println!("    {}", style(format!("{e:#}")).red());
                }
            }
        }

        if failures > 0 {
            anyhow::bail!("{} of {} table(s) failed", failures, paths.len());
        }
        println!("{}", style("✓ All tables valid").green().bold());
        Ok(())
    }
}

fn round_trip(table: &LootTable<ItemStack>, ctx: &ConversionContext<'_, ItemStack>) -> Result<()> {
    let canonical = table.serialize(ctx)?;
    let again = LootTable::deserialize(&canonical, ctx)?.serialize(ctx)?;
    if again != canonical {
        anyhow::bail!("canonical form changed after a round trip");
    }
    Ok(())
}
