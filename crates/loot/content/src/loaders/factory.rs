//! Content factory for building a loader and its tables from data files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use loot_core::{BuildError, ConversionContext, LootLoader, LootTable};
use tracing::{debug, info};

use crate::builtins::configured_loader;
use crate::config::LootConfig;
use crate::item::{ItemCatalog, ItemStack};
use crate::keys::ITEM_CATALOG;
use crate::loaders::{ConfigLoader, ItemLoader, LoadResult, TableLoader};

/// Content factory that loads all loot content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── items.ron          (optional)
/// └── tables/
///     ├── chest.json
///     ├── zombie.ron
///     └── ore.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load configuration from `config.toml`, or defaults when it is absent.
    pub fn load_config(&self) -> LoadResult<LootConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(LootConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the item catalog named by `config`, if the file exists.
    pub fn load_items(&self, config: &LootConfig) -> LoadResult<Option<ItemCatalog>> {
        let path = self.data_dir.join(&config.items_file);
        if !path.exists() {
            debug!(path = %path.display(), "no item catalog, accepting any item name");
            return Ok(None);
        }
        ItemLoader::load(&path).map(Some)
    }

    /// Directory holding table documents.
    pub fn tables_dir(&self, config: &LootConfig) -> PathBuf {
        self.data_dir.join(&config.tables_dir)
    }

    /// Load every table with `ctx`, keyed by file stem.
    pub fn load_tables(
        &self,
        config: &LootConfig,
        ctx: &ConversionContext<'_, ItemStack>,
    ) -> LoadResult<BTreeMap<String, LootTable<ItemStack>>> {
        TableLoader::load_dir(&self.tables_dir(config), ctx)
    }

    /// Load configuration, items and tables in one go.
    pub fn load(&self) -> LoadResult<Content> {
        let config = self.load_config()?;
        let catalog = self.load_items(&config)?.map(Arc::new);
        let loader = configured_loader(&config)?;

        let tables = {
            let ctx = conversion_context(&loader, catalog.as_ref())?;
            self.load_tables(&config, &ctx)?
        };
        info!(
            data_dir = %self.data_dir.display(),
            tables = tables.len(),
            items = catalog.as_ref().map_or(0, |catalog| catalog.len()),
            "loaded loot content"
        );

        Ok(Content {
            config,
            catalog,
            loader,
            tables,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// A conversion context over `loader` that carries `catalog` when present.
pub fn conversion_context<'a>(
    loader: &'a LootLoader<ItemStack>,
    catalog: Option<&Arc<ItemCatalog>>,
) -> Result<ConversionContext<'a, ItemStack>, BuildError> {
    let mut builder = ConversionContext::builder().loader(loader);
    if let Some(catalog) = catalog {
        builder = builder.with_information(&ITEM_CATALOG, Arc::clone(catalog));
    }
    builder.build()
}

/// Everything loaded from one data directory.
#[derive(Debug)]
pub struct Content {
    pub config: LootConfig,
    pub catalog: Option<Arc<ItemCatalog>>,
    pub loader: LootLoader<ItemStack>,
    pub tables: BTreeMap<String, LootTable<ItemStack>>,
}

impl Content {
    pub fn table(&self, name: &str) -> Option<&LootTable<ItemStack>> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// A conversion context over this content's loader, carrying the catalog.
    pub fn conversion_context(&self) -> Result<ConversionContext<'_, ItemStack>, BuildError> {
        conversion_context(&self.loader, self.catalog.as_ref())
    }
}
