//! Item catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::item::{ItemCatalog, ItemDefinition};
use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalogFile {
    pub items: Vec<ItemDefinition>,
}

/// Loader for item catalog from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item catalog from a RON file.
    ///
    /// Duplicate ids are rejected.
    pub fn load(path: &Path) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        let file: ItemCatalogFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for item in &file.items {
            if !seen.insert(item.id.as_str()) {
                anyhow::bail!("Duplicate item \"{}\" in {}", item.id, path.display());
            }
        }

        Ok(ItemCatalog::new(file.items))
    }
}
