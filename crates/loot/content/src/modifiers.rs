//! Built-in modifiers. Each one also accepts an optional `conditions` list.

use std::collections::BTreeMap;
use std::sync::Arc;

use loot_core::convert::node;
use loot_core::structure::erase_modifier;
use loot_core::{
    ConditionalTransform, ConversionError, Converter, Defaulted, GenerationContext, GenerationError,
    KeyedConverter, LootContext, LootModifier, Node, NodeMap, NumberProvider,
};
use serde_json::json;

use crate::Ctx;
use crate::item::ItemStack;
use crate::keys::EXPLOSION_RADIUS;

type Modifier = Arc<dyn LootModifier<ItemStack>>;
type Number = Arc<dyn NumberProvider<ItemStack>>;
type ModifierConverter<T> = KeyedConverter<ItemStack, T, dyn LootModifier<ItemStack>>;

fn read_number(map: &NodeMap, field: &str, ctx: &Ctx<'_>) -> Result<Number, ConversionError> {
    ctx.loader()
        .number_providers()
        .deserialize(map.get(field), field, ctx)
        .map_err(|err| err.at(field))
}

fn write_number(
    into: &mut NodeMap,
    field: &str,
    number: &Number,
    ctx: &Ctx<'_>,
) -> Result<(), ConversionError> {
    let node = ctx.loader().number_providers().serialize(number.as_ref(), ctx)?;
    into.insert(field.to_owned(), node);
    Ok(())
}

fn read_add(map: &NodeMap) -> Result<Defaulted<bool>, ConversionError> {
    node::defaulted_bool(map.get("add"), "add", false)
}

fn to_count(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

// set_count

/// Sets the stack size, or adds to it when `add` is set. Never below zero.
#[derive(Debug)]
pub struct SetCount {
    pub count: Number,
    pub add: Defaulted<bool>,
    pub conditions: ConditionalTransform<ItemStack>,
}

pub const SET_COUNT: ModifierConverter<SetCount> =
    KeyedConverter::new("set_count", write_set_count, read_set_count, erase_modifier);

fn write_set_count(modifier: &SetCount, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    write_number(into, "count", &modifier.count, ctx)?;
    modifier.add.write(into, "add");
    modifier.conditions.serialize(into, ctx)
}

fn read_set_count(node: &Node, ctx: &Ctx<'_>) -> Result<SetCount, ConversionError> {
    let map = node::require_map(Some(node), "set_count")?;
    Ok(SetCount {
        count: read_number(map, "count", ctx)?,
        add: read_add(map)?,
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<ItemStack> for SetCount {
    fn conditions(&self) -> &ConditionalTransform<ItemStack> {
        &self.conditions
    }

    fn transform(&self, mut item: ItemStack, ctx: &GenerationContext) -> Result<ItemStack, GenerationError> {
        let count = self.count.get_i64(ctx)?;
        let base = if self.add.get() { i64::from(item.count) } else { 0 };
        item.count = to_count(base.saturating_add(count));
        Ok(item)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootModifier<ItemStack>>> {
        Arc::new(SET_COUNT)
    }
}

// set_damage

/// Sets durability from a fraction of `max_damage` remaining.
///
/// `damage` is the fraction left intact: 1.0 is pristine, 0.0 is broken.
/// With `add`, the missing fraction is repaired on top of the current damage.
/// Unbreakable items and items without durability are left alone.
#[derive(Debug)]
pub struct SetDamage {
    pub damage: Number,
    pub add: Defaulted<bool>,
    pub conditions: ConditionalTransform<ItemStack>,
}

pub const SET_DAMAGE: ModifierConverter<SetDamage> =
    KeyedConverter::new("set_damage", write_set_damage, read_set_damage, erase_modifier);

fn write_set_damage(modifier: &SetDamage, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    write_number(into, "damage", &modifier.damage, ctx)?;
    modifier.add.write(into, "add");
    modifier.conditions.serialize(into, ctx)
}

fn read_set_damage(node: &Node, ctx: &Ctx<'_>) -> Result<SetDamage, ConversionError> {
    let map = node::require_map(Some(node), "set_damage")?;
    Ok(SetDamage {
        damage: read_number(map, "damage", ctx)?,
        add: read_add(map)?,
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<ItemStack> for SetDamage {
    fn conditions(&self) -> &ConditionalTransform<ItemStack> {
        &self.conditions
    }

    fn transform(&self, mut item: ItemStack, ctx: &GenerationContext) -> Result<ItemStack, GenerationError> {
        if !item.is_damageable() {
            return Ok(item);
        }
        let max = i64::from(item.max_damage);
        let value = ((1.0 - self.damage.get_f64(ctx)?) * max as f64) as i64;
        let damage = if self.add.get() {
            i64::from(item.damage) - (max - value)
        } else {
            value
        };
        item.damage = damage.clamp(0, max) as u32;
        Ok(item)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootModifier<ItemStack>>> {
        Arc::new(SET_DAMAGE)
    }
}

// set_enchantments

/// Sets enchantment levels, replacing the existing ones unless `add` is set.
///
/// Levels below 1 remove the enchantment.
#[derive(Debug)]
pub struct SetEnchantments {
    pub enchantments: BTreeMap<String, Number>,
    pub add: Defaulted<bool>,
    pub conditions: ConditionalTransform<ItemStack>,
}

pub const SET_ENCHANTMENTS: ModifierConverter<SetEnchantments> = KeyedConverter::new(
    "set_enchantments",
    write_set_enchantments,
    read_set_enchantments,
    erase_modifier,
);

fn write_set_enchantments(
    modifier: &SetEnchantments,
    into: &mut NodeMap,
    ctx: &Ctx<'_>,
) -> Result<(), ConversionError> {
    let mut enchantments = NodeMap::new();
    for (name, level) in &modifier.enchantments {
        write_number(&mut enchantments, name, level, ctx)?;
    }
    into.insert("enchantments".into(), Node::Object(enchantments));
    modifier.add.write(into, "add");
    modifier.conditions.serialize(into, ctx)
}

fn read_set_enchantments(node: &Node, ctx: &Ctx<'_>) -> Result<SetEnchantments, ConversionError> {
    let map = node::require_map(Some(node), "set_enchantments")?;
    let levels = node::require_map(map.get("enchantments"), "enchantments")?;
    let enchantments = levels
        .keys()
        .map(|name| {
            read_number(levels, name, ctx)
                .map(|level| (name.clone(), level))
                .map_err(|err| err.at("enchantments"))
        })
        .collect::<Result<_, _>>()?;
    Ok(SetEnchantments {
        enchantments,
        add: read_add(map)?,
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<ItemStack> for SetEnchantments {
    fn conditions(&self) -> &ConditionalTransform<ItemStack> {
        &self.conditions
    }

    fn transform(&self, mut item: ItemStack, ctx: &GenerationContext) -> Result<ItemStack, GenerationError> {
        if !self.add.get() {
            item.enchantments.clear();
        }
        for (name, level) in &self.enchantments {
            let level = level.get_i64(ctx)?;
            if level < 1 {
                item.enchantments.remove(name);
            } else {
                item.enchantments.insert(name.clone(), to_count(level));
            }
        }
        Ok(item)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootModifier<ItemStack>>> {
        Arc::new(SET_ENCHANTMENTS)
    }
}

// limit_count

/// Clamps the stack size into `[min, max]`; either bound may be absent.
#[derive(Debug)]
pub struct LimitCount {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub conditions: ConditionalTransform<ItemStack>,
}

pub const LIMIT_COUNT: ModifierConverter<LimitCount> =
    KeyedConverter::new("limit_count", write_limit_count, read_limit_count, erase_modifier);

fn write_limit_count(modifier: &LimitCount, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    if let Some(min) = modifier.min {
        into.insert("min".into(), json!(min));
    }
    if let Some(max) = modifier.max {
        into.insert("max".into(), json!(max));
    }
    modifier.conditions.serialize(into, ctx)
}

fn read_bound(map: &NodeMap, field: &str) -> Result<Option<u32>, ConversionError> {
    match map.get(field) {
        None | Some(Node::Null) => Ok(None),
        node => {
            let value = node::require_u64(node, field)?;
            u32::try_from(value)
                .map(Some)
                .map_err(|_| ConversionError::invalid(field, format!("{value} is too large")))
        }
    }
}

fn read_limit_count(node: &Node, ctx: &Ctx<'_>) -> Result<LimitCount, ConversionError> {
    let map = node::require_map(Some(node), "limit_count")?;
    let min = read_bound(map, "min")?;
    let max = read_bound(map, "max")?;
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(ConversionError::invalid("limit_count", format!("min {min} exceeds max {max}")));
    }
    Ok(LimitCount {
        min,
        max,
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<ItemStack> for LimitCount {
    fn conditions(&self) -> &ConditionalTransform<ItemStack> {
        &self.conditions
    }

    fn transform(&self, mut item: ItemStack, _: &GenerationContext) -> Result<ItemStack, GenerationError> {
        if let Some(min) = self.min {
            item.count = item.count.max(min);
        }
        if let Some(max) = self.max {
            item.count = item.count.min(max);
        }
        Ok(item)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootModifier<ItemStack>>> {
        Arc::new(LIMIT_COUNT)
    }
}

// explosion_decay

/// Each item in the stack survives an explosion with probability `1 / radius`.
#[derive(Debug)]
pub struct ExplosionDecay {
    pub conditions: ConditionalTransform<ItemStack>,
}

pub const EXPLOSION_DECAY: ModifierConverter<ExplosionDecay> = KeyedConverter::new(
    "explosion_decay",
    write_explosion_decay,
    read_explosion_decay,
    erase_modifier,
);

fn write_explosion_decay(
    modifier: &ExplosionDecay,
    into: &mut NodeMap,
    ctx: &Ctx<'_>,
) -> Result<(), ConversionError> {
    modifier.conditions.serialize(into, ctx)
}

fn read_explosion_decay(node: &Node, ctx: &Ctx<'_>) -> Result<ExplosionDecay, ConversionError> {
    let map = node::require_map(Some(node), "explosion_decay")?;
    Ok(ExplosionDecay {
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<ItemStack> for ExplosionDecay {
    fn conditions(&self) -> &ConditionalTransform<ItemStack> {
        &self.conditions
    }

    fn transform(&self, mut item: ItemStack, ctx: &GenerationContext) -> Result<ItemStack, GenerationError> {
        let Some(&radius) = ctx.get(&EXPLOSION_RADIUS)? else {
            return Ok(item);
        };
        if radius <= 1.0 {
            return Ok(item);
        }
        let chance = 1.0 / radius;
        let survivors = ctx.with_random(|random| {
            (0..item.count).filter(|_| random.next_f64() <= chance).count()
        });
        item.count = u32::try_from(survivors).unwrap_or(item.count);
        Ok(item)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootModifier<ItemStack>>> {
        Arc::new(EXPLOSION_DECAY)
    }
}

pub fn set_count(count: Number, add: bool) -> Modifier {
    erase_modifier(SetCount {
        count,
        add: Defaulted::new(false).with(add),
        conditions: ConditionalTransform::always(),
    })
}

pub fn set_damage(damage: Number, add: bool) -> Modifier {
    erase_modifier(SetDamage {
        damage,
        add: Defaulted::new(false).with(add),
        conditions: ConditionalTransform::always(),
    })
}

pub fn limit_count(min: Option<u32>, max: Option<u32>) -> Modifier {
    erase_modifier(LimitCount {
        min,
        max,
        conditions: ConditionalTransform::always(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin_loader;
    use crate::item::ItemDefinition;
    use crate::numbers::constant;

    fn ctx() -> GenerationContext {
        GenerationContext::builder().seed(11).build().unwrap()
    }

    fn sword(damage: u32) -> ItemStack {
        let mut stack = ItemStack::from_definition(&ItemDefinition::named("sword").with_max_damage(100));
        stack.damage = damage;
        stack
    }

    #[test]
    fn set_count_sets_or_adds() {
        let gem = ItemStack::from_definition(&ItemDefinition::named("gem"));
        let set = set_count(constant(5.0), false).apply(gem.clone(), &ctx()).unwrap();
        assert_eq!(set.count, 5);

        let added = set_count(constant(5.0), true).apply(set, &ctx()).unwrap();
        assert_eq!(added.count, 10);

        let floored = set_count(constant(-20.0), true).apply(added, &ctx()).unwrap();
        assert_eq!(floored.count, 0);
    }

    #[test]
    fn set_damage_uses_remaining_fraction() {
        // a quarter intact means three quarters damaged
        let item = set_damage(constant(0.25), false).apply(sword(0), &ctx()).unwrap();
        assert_eq!(item.damage, 75);

        // adding repairs (max - value) on top of the current damage
        let item = set_damage(constant(0.25), true).apply(sword(50), &ctx()).unwrap();
        assert_eq!(item.damage, 25);

        let item = set_damage(constant(0.9), true).apply(sword(50), &ctx()).unwrap();
        assert_eq!(item.damage, 0);
    }

    #[test]
    fn set_damage_skips_undamageable_items() {
        let mut shield = sword(10);
        shield.unbreakable = true;
        let item = set_damage(constant(0.0), false).apply(shield.clone(), &ctx()).unwrap();
        assert_eq!(item, shield);

        let gem = ItemStack::from_definition(&ItemDefinition::named("gem"));
        let item = set_damage(constant(0.0), false).apply(gem.clone(), &ctx()).unwrap();
        assert_eq!(item, gem);
    }

    #[test]
    fn enchantments_replace_unless_added() {
        let loader = builtin_loader().unwrap();
        let conversion = loader.conversion_context();
        let read = |document: Node| {
            loader
                .modifiers()
                .deserialize(Some(&document), "function", &conversion)
                .unwrap()
        };

        let mut item = sword(0);
        item.enchantments.insert("sharpness".into(), 2);

        let replace = read(json!({
            "type": "set_enchantments",
            "enchantments": { "looting": 3, "mending": 0 }
        }));
        let replaced = replace.apply(item.clone(), &ctx()).unwrap();
        assert_eq!(
            replaced.enchantments.into_iter().collect::<Vec<_>>(),
            vec![("looting".to_owned(), 3)]
        );

        let add = read(json!({
            "type": "set_enchantments",
            "enchantments": { "looting": { "type": "constant", "value": 1.0 } },
            "add": true
        }));
        let added = add.apply(item, &ctx()).unwrap();
        assert_eq!(added.enchantments.len(), 2);
        assert_eq!(added.enchantments["sharpness"], 2);
    }

    #[test]
    fn limit_count_clamps() {
        let mut stack = ItemStack::from_definition(&ItemDefinition::named("arrow"));
        stack.count = 40;
        let limited = limit_count(None, Some(16)).apply(stack, &ctx()).unwrap();
        assert_eq!(limited.count, 16);

        let raised = limit_count(Some(20), None).apply(limited, &ctx()).unwrap();
        assert_eq!(raised.count, 20);
    }

    #[test]
    fn explosion_decay_needs_an_explosion() {
        let mut stack = ItemStack::from_definition(&ItemDefinition::named("arrow"));
        stack.count = 30;
        let decay = erase_modifier(ExplosionDecay {
            conditions: ConditionalTransform::always(),
        });

        let calm = decay.apply(stack.clone(), &ctx()).unwrap();
        assert_eq!(calm.count, 30);

        let blast = GenerationContext::builder()
            .seed(11)
            .with_information(&EXPLOSION_RADIUS, 1e9)
            .build()
            .unwrap();
        assert!(decay.apply(stack, &blast).unwrap().count < 3);
    }

    #[test]
    fn modifiers_round_trip_with_conditions() {
        let loader = builtin_loader().unwrap();
        let conversion = loader.conversion_context();
        let document = json!({
            "type": "set_damage",
            "damage": { "type": "uniform", "min": 0.5, "max": 1.0 },
            "add": true,
            "conditions": [{ "type": "killed_by_player" }]
        });

        let modifier = loader
            .modifiers()
            .deserialize(Some(&document), "function", &conversion)
            .unwrap();
        assert_eq!(
            loader.modifiers().serialize(modifier.as_ref(), &conversion).unwrap(),
            document
        );
    }

    #[test]
    fn bad_numbers_are_located() {
        let loader = builtin_loader().unwrap();
        let conversion = loader.conversion_context();
        let document = json!({ "type": "set_count", "count": "lots" });
        let err = loader
            .modifiers()
            .deserialize(Some(&document), "function", &conversion)
            .unwrap_err();
        assert_eq!(err.path(), Some("count"));
    }
}
