//! Command implementations for the `loot` binary
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod dump;
mod list;
mod roll;

pub use check::Check;
pub use dump::Dump;
pub use list::List;
pub use roll::Roll;

use std::path::PathBuf;

use anyhow::{Context, Result};
use loot_content::{Content, ContentFactory};

use crate::config::CliConfig;

/// Data directory flag shared by every command.
#[derive(clap::Args, Debug)]
pub struct DataArgs {
    /// Data directory (defaults to `LOOT_DATA_DIR`, then `data`)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

impl DataArgs {
    pub fn factory(&self, config: &CliConfig) -> ContentFactory {
        let dir = self.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
        ContentFactory::new(dir)
    }

    pub fn load(&self, config: &CliConfig) -> Result<Content> {
        let factory = self.factory(config);
        factory
            .load()
            .with_context(|| format!("Failed to load content from {}", factory.data_dir().display()))
    }
}

/// Looks up `name`, listing the available tables when it is missing.
pub fn find_table<'a>(
    content: &'a Content,
    name: &str,
) -> Result<&'a loot_core::LootTable<loot_content::ItemStack>> {
    content.table(name).ok_or_else(|| {
        let available = content.table_names().collect::<Vec<_>>().join(", ");
        anyhow::anyhow!("Unknown table \"{}\" (available: {})", name, available)
    })
}
