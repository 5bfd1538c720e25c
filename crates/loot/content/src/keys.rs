//! Information keys understood by the built-in catalog.
//!
//! Luck lives in [`loot_core::context::keys::LUCK`].

use std::sync::Arc;

use loot_core::Key;

use crate::item::ItemCatalog;

/// Conversion fact: item kinds that `item` entries may name.
pub const ITEM_CATALOG: Key<Arc<ItemCatalog>> = Key::new("item_catalog");

/// Radius of the explosion that destroyed the loot source.
pub const EXPLOSION_RADIUS: Key<f64> = Key::new("explosion_radius");

/// Id of the tool used to break the loot source.
pub const TOOL: Key<String> = Key::new("tool");

/// Set when a player landed the killing blow.
pub const KILLED_BY_PLAYER: Key<bool> = Key::new("killed_by_player");
