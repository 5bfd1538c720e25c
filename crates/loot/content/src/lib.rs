//! Item content for `loot-core` and loaders for loot data files.
//!
//! This crate provides:
//! - [`ItemStack`], the item type generated by the built-in catalog
//! - built-in conditions, number providers, modifiers and entries
//! - [`register_builtins`] to plug them into a [`loot_core::LootLoader`]
//! - loaders for item catalogs (RON), configuration (TOML) and loot tables
//!   (JSON, RON or TOML), behind the default `loaders` feature

pub mod builtins;
pub mod conditions;
pub mod config;
pub mod entries;
pub mod item;
pub mod keys;
pub mod modifiers;
pub mod numbers;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use builtins::{builtin_loader, configured_loader, register_builtins};
pub use config::LootConfig;
pub use item::{ItemCatalog, ItemDefinition, ItemStack};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, Content, ContentFactory, DocumentFormat, ItemLoader, LoadResult, TableLoader,
};

pub(crate) type Ctx<'a> = loot_core::ConversionContext<'a, ItemStack>;
