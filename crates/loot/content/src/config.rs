//! Content configuration.

use serde::{Deserialize, Serialize};

/// Settings read from `config.toml` in the data directory.
///
/// Every field has a default, so an absent file or section is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// Discriminator field shared by every category.
    pub element_name: String,
    /// Seed used when a caller does not pick one.
    pub default_seed: Option<u64>,
    /// Directory of table documents, relative to the data directory.
    pub tables_dir: String,
    /// Item catalog file, relative to the data directory.
    pub items_file: String,
}

impl LootConfig {
    pub const DEFAULT_ELEMENT_NAME: &'static str = "type";
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            element_name: Self::DEFAULT_ELEMENT_NAME.to_owned(),
            default_seed: None,
            tables_dir: "tables".to_owned(),
            items_file: "items.ron".to_owned(),
        }
    }
}
