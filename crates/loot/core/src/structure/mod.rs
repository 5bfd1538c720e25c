//! Loot structures: the object graph that deserialized documents become.
//!
//! Each category is a trait whose objects carry their own converter:
//!
//! | Trait | Registry | Field name |
//! |---|---|---|
//! | [`LootCondition`] | `conditions` | `conditions` |
//! | [`NumberProvider`] | `number_providers` | `rolls`, `count`, ... |
//! | [`LootModifier`] | `modifiers` | `functions` |
//! | [`LootEntry`] | `entries` | `entries`, `children` |
//!
//! [`LootPool`] and [`LootTable`] are fixed shapes and are converted directly
//! instead of through a registry.
mod composite;
mod condition;
mod entry;
mod modifier;
mod number;
mod pool;
mod table;
mod transform;

pub use composite::{
    CompositeConverter, CompositeEntry, CompositeKind, composite_converters,
};
pub use condition::{LootCondition, erase_condition};
pub use entry::{EntryWeight, LootEntry, LootOption, TerminalEntry, erase_entry};
pub use modifier::{FUNCTIONS_FIELD, LootModifier, apply_modifiers, erase_modifier};
pub use number::{NumberProvider, erase_number};
pub use pool::LootPool;
pub use table::LootTable;
pub use transform::{CONDITIONS_FIELD, ConditionalTransform};

use std::fmt::Debug;

/// Bound for the host's item type.
pub trait LootItem: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> LootItem for T {}
