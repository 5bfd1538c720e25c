//! Built-in terminal entries.
//!
//! `item` names an item kind. When the conversion context carries an
//! [`ITEM_CATALOG`] the name must be known to it and the stack picks up the
//! catalog's durability; without one any name is accepted as a plain item.
//! A bare string node is shorthand for an `item` entry with default weight.

use std::sync::Arc;

use loot_core::convert::node;
use loot_core::structure::erase_entry;
use loot_core::{
    ConversionError, ConversionRegistry, Converter, GenerationContext, GenerationError,
    KeyedConverter, LootContext, LootEntry, LootOption, Node, NodeMap, TerminalEntry,
};
use serde_json::json;

use crate::Ctx;
use crate::item::{ItemDefinition, ItemStack};
use crate::keys::ITEM_CATALOG;

type Entry = Arc<dyn LootEntry<ItemStack>>;
type EntryConverter<T> = KeyedConverter<ItemStack, T, dyn LootEntry<ItemStack>>;

#[derive(Debug)]
pub struct ItemEntry {
    pub definition: ItemDefinition,
    pub terminal: TerminalEntry<ItemStack>,
}

pub const ITEM: EntryConverter<ItemEntry> =
    KeyedConverter::new("item", write_item, read_item, erase_entry);

fn write_item(entry: &ItemEntry, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("name".into(), json!(entry.definition.id));
    entry.terminal.serialize(into, ctx)
}

fn read_item(node: &Node, ctx: &Ctx<'_>) -> Result<ItemEntry, ConversionError> {
    let map = node::require_map(Some(node), "item")?;
    let name = node::require_str(map.get("name"), "name")?;
    Ok(ItemEntry {
        definition: resolve_item(name, ctx)?,
        terminal: TerminalEntry::deserialize(map, ctx)?,
    })
}

fn resolve_item(name: &str, ctx: &Ctx<'_>) -> Result<ItemDefinition, ConversionError> {
    match ctx.get(&ITEM_CATALOG)? {
        Some(catalog) => catalog
            .get(name)
            .cloned()
            .ok_or_else(|| ConversionError::invalid("name", format!("unknown item \"{name}\""))),
        None => Ok(ItemDefinition::named(name)),
    }
}

impl LootEntry<ItemStack> for ItemEntry {
    fn request_options<'a>(
        &'a self,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<ItemStack>>, GenerationError> {
        self.terminal.options(self, ctx)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootEntry<ItemStack>>> {
        Arc::new(ITEM)
    }
}

impl LootOption<ItemStack> for ItemEntry {
    fn weight(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        self.terminal.weight(ctx)
    }

    fn generate(&self, ctx: &GenerationContext) -> Result<Vec<ItemStack>, GenerationError> {
        let stack = ItemStack::from_definition(&self.definition);
        self.terminal.finish(vec![stack], ctx)
    }
}

/// Takes up weight in a pool but produces nothing.
#[derive(Debug)]
pub struct EmptyEntry {
    pub terminal: TerminalEntry<ItemStack>,
}

pub const EMPTY: EntryConverter<EmptyEntry> =
    KeyedConverter::new("empty", write_empty, read_empty, erase_entry);

fn write_empty(entry: &EmptyEntry, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    entry.terminal.serialize(into, ctx)
}

fn read_empty(node: &Node, ctx: &Ctx<'_>) -> Result<EmptyEntry, ConversionError> {
    let map = node::require_map(Some(node), "empty")?;
    Ok(EmptyEntry {
        terminal: TerminalEntry::deserialize(map, ctx)?,
    })
}

impl LootEntry<ItemStack> for EmptyEntry {
    fn request_options<'a>(
        &'a self,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<ItemStack>>, GenerationError> {
        self.terminal.options(self, ctx)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootEntry<ItemStack>>> {
        Arc::new(EMPTY)
    }
}

impl LootOption<ItemStack> for EmptyEntry {
    fn weight(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        self.terminal.weight(ctx)
    }

    fn generate(&self, _: &GenerationContext) -> Result<Vec<ItemStack>, GenerationError> {
        Ok(Vec::new())
    }
}

/// Default deserializer for entries: a bare string is an `item`.
pub fn shorthand_entry(
    node: &Node,
    _: &ConversionRegistry<ItemStack, dyn LootEntry<ItemStack>>,
    ctx: &Ctx<'_>,
) -> Result<Option<Entry>, ConversionError> {
    let Some(name) = node.as_str() else {
        return Ok(None);
    };
    let definition = resolve_item(name, ctx)?;
    Ok(Some(item_entry(definition, TerminalEntry::new())))
}

pub fn item_entry(definition: ItemDefinition, terminal: TerminalEntry<ItemStack>) -> Entry {
    erase_entry(ItemEntry {
        definition,
        terminal,
    })
}

pub fn empty_entry(terminal: TerminalEntry<ItemStack>) -> Entry {
    erase_entry(EmptyEntry { terminal })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loot_core::{ConversionContext, EntryWeight, PickMode, WeightedPool};
    use serde_json::json;

    use super::*;
    use crate::builtin_loader;
    use crate::item::ItemCatalog;

    fn catalog() -> Arc<ItemCatalog> {
        Arc::new(ItemCatalog::new([
            ItemDefinition::named("apple"),
            ItemDefinition::named("bow").with_max_damage(384),
        ]))
    }

    #[test]
    fn catalog_supplies_durability() {
        let loader = builtin_loader().unwrap();
        let ctx = ConversionContext::builder()
            .loader(&loader)
            .with_information(&ITEM_CATALOG, catalog())
            .build()
            .unwrap();

        let entry = loader
            .entries()
            .deserialize(Some(&json!("bow")), "entry", &ctx)
            .unwrap();
        let generation = GenerationContext::builder().seed(1).build().unwrap();
        let entries = vec![entry];
        let items = WeightedPool::collect(&entries, &generation)
            .unwrap()
            .generate(&generation, PickMode::All)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].max_damage, 384);
    }

    #[test]
    fn unknown_items_fail_against_a_catalog() {
        let loader = builtin_loader().unwrap();
        let ctx = ConversionContext::builder()
            .loader(&loader)
            .with_information(&ITEM_CATALOG, catalog())
            .build()
            .unwrap();

        let err = loader
            .entries()
            .deserialize(Some(&json!({ "type": "item", "name": "pear" })), "entry", &ctx)
            .unwrap_err();
        assert!(matches!(err, ConversionError::Invalid { ref label, .. } if label == "name"));

        // without a catalog any name goes
        let open = loader.conversion_context();
        assert!(
            loader
                .entries()
                .deserialize(Some(&json!("pear")), "entry", &open)
                .is_ok()
        );
    }

    #[test]
    fn empty_entries_hold_weight_only() {
        let entries = vec![empty_entry(
            TerminalEntry::new().with_weight(EntryWeight::new(4, 0)),
        )];
        let generation = GenerationContext::builder().seed(1).build().unwrap();
        let pool = WeightedPool::collect(&entries, &generation).unwrap();
        assert_eq!(pool.total_weight(), 4);
        assert!(pool.pick(&generation).unwrap().generate(&generation).unwrap().is_empty());
    }

    #[test]
    fn entries_round_trip() {
        let loader = builtin_loader().unwrap();
        let ctx = loader.conversion_context();
        let document = json!({
            "type": "item",
            "name": "apple",
            "weight": 5,
            "functions": [{ "type": "set_count", "count": { "type": "constant", "value": 3.0 } }]
        });

        let entry = loader.entries().deserialize(Some(&document), "entry", &ctx).unwrap();
        assert_eq!(loader.entries().serialize(entry.as_ref(), &ctx).unwrap(), document);
    }
}
