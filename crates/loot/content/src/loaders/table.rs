//! Loot table loader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use loot_core::{ConversionContext, LootTable};
use tracing::debug;

use crate::item::ItemStack;
use crate::loaders::{DocumentFormat, LoadResult, read_document};

/// Loader for loot table documents.
pub struct TableLoader;

impl TableLoader {
    /// Load a single table, converting it with `ctx`.
    pub fn load(path: &Path, ctx: &ConversionContext<'_, ItemStack>) -> LoadResult<LootTable<ItemStack>> {
        let document = read_document(path)?;
        LootTable::deserialize(&document, ctx)
            .map_err(|e| anyhow::anyhow!("Failed to convert loot table {}: {}", path.display(), e))
    }

    /// Table documents directly inside `dir`, sorted by path.
    ///
    /// Files without a recognised extension are ignored.
    pub fn discover(dir: &Path) -> LoadResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?
                .path();
            if path.is_file() && DocumentFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Load every table in `dir`, keyed by file stem.
    ///
    /// Two documents with the same stem (`chest.json` and `chest.ron`) are
    /// rejected rather than one silently shadowing the other.
    pub fn load_dir(
        dir: &Path,
        ctx: &ConversionContext<'_, ItemStack>,
    ) -> LoadResult<BTreeMap<String, LootTable<ItemStack>>> {
        let mut tables = BTreeMap::new();
        for path in Self::discover(dir)? {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid table file name {}", path.display()))?
                .to_owned();
            if tables.contains_key(&name) {
                anyhow::bail!("Duplicate loot table \"{}\" at {}", name, path.display());
            }
            debug!(table = %name, path = %path.display(), "loading loot table");
            let table = Self::load(&path, ctx)?;
            tables.insert(name, table);
        }
        Ok(tables)
    }
}
