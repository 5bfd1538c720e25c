//! Item stacks produced by the built-in loot catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static description of an item kind, read from the item catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Durability; 0 means the item cannot be damaged.
    #[serde(default)]
    pub max_damage: u32,
    #[serde(default)]
    pub unbreakable: bool,
}

fn default_max_stack() -> u32 {
    64
}

impl ItemDefinition {
    /// A stackable, undamageable item.
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            max_stack: default_max_stack(),
            max_damage: 0,
            unbreakable: false,
        }
    }

    #[must_use]
    pub fn with_max_damage(mut self, max_damage: u32) -> Self {
        self.max_damage = max_damage;
        self
    }

    #[must_use]
    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    #[must_use]
    pub fn unbreakable(mut self) -> Self {
        self.unbreakable = true;
        self
    }
}

/// A generated item: one kind, a count and per-stack state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub damage: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_damage: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unbreakable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantments: BTreeMap<String, u32>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ItemStack {
    /// A single, undamaged item of `definition`.
    pub fn from_definition(definition: &ItemDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            count: 1,
            damage: 0,
            max_damage: definition.max_damage,
            unbreakable: definition.unbreakable,
            enchantments: BTreeMap::new(),
        }
    }

    pub fn is_damageable(&self) -> bool {
        self.max_damage > 0 && !self.unbreakable
    }
}

/// Known item kinds, keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    items: BTreeMap<String, ItemDefinition>,
}

impl ItemCatalog {
    /// Builds a catalog; later definitions replace earlier ones with the same id.
    pub fn new(items: impl IntoIterator<Item = ItemDefinition>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|definition| (definition.id.clone(), definition))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    /// A single item of kind `id`, if the kind is known.
    pub fn stack(&self, id: &str) -> Option<ItemStack> {
        self.get(id).map(ItemStack::from_definition)
    }
}
