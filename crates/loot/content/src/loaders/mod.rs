//! Loaders for reading loot data from files.
//!
//! Item catalogs are RON, configuration is TOML, and loot tables may be any
//! of [`DocumentFormat`]; every table format is parsed into the same
//! [`Node`] tree before conversion.

pub mod config;
pub mod factory;
pub mod item;
pub mod table;

pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory, conversion_context};
pub use item::ItemLoader;
pub use table::TableLoader;

use std::path::Path;

use loot_core::Node;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Text formats accepted for loot table documents, named by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentFormat {
    Json,
    Ron,
    Toml,
}

impl DocumentFormat {
    /// The format matching `path`'s extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    pub fn extension(self) -> &'static str {
        self.into()
    }

    /// Parses `content` into a node tree.
    pub fn parse(self, content: &str) -> LoadResult<Node> {
        let node = match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse JSON: {}", e))?,
            Self::Ron => ron::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse RON: {}", e))?,
            Self::Toml => toml::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?,
        };
        Ok(node)
    }
}

/// Reads and parses a document, picking the format from its extension.
pub fn read_document(path: &Path) -> LoadResult<Node> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        anyhow::anyhow!("Unsupported document format for {}", path.display())
    })?;
    let content = read_file(path)?;
    format
        .parse(&content)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}
