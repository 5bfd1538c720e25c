//! Built-in conditions.
//!
//! | key                  | fields                 |
//! |----------------------|------------------------|
//! | `random_chance`      | `chance`               |
//! | `inverted`           | `term`                 |
//! | `all_of`             | `terms`                |
//! | `any_of`             | `terms`                |
//! | `has_information`    | `key`                  |
//! | `killed_by_player`   | `inverse` (optional)   |
//! | `match_tool`         | `items`                |
//! | `survives_explosion` |                        |

use std::sync::Arc;

use loot_core::convert::node;
use loot_core::structure::erase_condition;
use loot_core::{
    ConversionError, Converter, Defaulted, GenerationContext, GenerationError, KeyedConverter,
    LootCondition, LootContext, Node, NodeMap,
};
use serde_json::json;

use crate::Ctx;
use crate::item::ItemStack;
use crate::keys::{EXPLOSION_RADIUS, KILLED_BY_PLAYER, TOOL};

type Condition = Arc<dyn LootCondition<ItemStack>>;
type ConditionConverter<T> = KeyedConverter<ItemStack, T, dyn LootCondition<ItemStack>>;

fn read_term(map: &NodeMap, field: &str, ctx: &Ctx<'_>) -> Result<Condition, ConversionError> {
    ctx.loader()
        .conditions()
        .deserialize(map.get(field), field, ctx)
        .map_err(|err| err.at(field))
}

fn read_terms(map: &NodeMap, field: &str, ctx: &Ctx<'_>) -> Result<Vec<Condition>, ConversionError> {
    let terms = map.get(field);
    node::require_list(terms, field)?;
    ctx.loader().conditions().deserialize_list(terms, field, ctx)
}

// random_chance

/// Passes with probability `chance`.
#[derive(Debug)]
pub struct RandomChance {
    pub chance: f64,
}

pub const RANDOM_CHANCE: ConditionConverter<RandomChance> =
    KeyedConverter::new("random_chance", write_random_chance, read_random_chance, erase_condition);

fn write_random_chance(
    condition: &RandomChance,
    into: &mut NodeMap,
    _: &Ctx<'_>,
) -> Result<(), ConversionError> {
    into.insert("chance".into(), json!(condition.chance));
    Ok(())
}

fn read_random_chance(node: &Node, _: &Ctx<'_>) -> Result<RandomChance, ConversionError> {
    let chance = node::require_f64(node.get("chance"), "chance")?;
    if !(0.0..=1.0).contains(&chance) {
        return Err(ConversionError::invalid("chance", format!("{chance} is not within [0, 1]")));
    }
    Ok(RandomChance { chance })
}

impl LootCondition<ItemStack> for RandomChance {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        Ok(ctx.random_f64() < self.chance)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(RANDOM_CHANCE)
    }
}

// inverted

#[derive(Debug)]
pub struct Inverted {
    pub term: Condition,
}

pub const INVERTED: ConditionConverter<Inverted> =
    KeyedConverter::new("inverted", write_inverted, read_inverted, erase_condition);

fn write_inverted(condition: &Inverted, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    let term = ctx.loader().conditions().serialize(condition.term.as_ref(), ctx)?;
    into.insert("term".into(), term);
    Ok(())
}

fn read_inverted(node: &Node, ctx: &Ctx<'_>) -> Result<Inverted, ConversionError> {
    let map = node::require_map(Some(node), "inverted")?;
    Ok(Inverted {
        term: read_term(map, "term", ctx)?,
    })
}

impl LootCondition<ItemStack> for Inverted {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        Ok(!self.term.verify(ctx)?)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(INVERTED)
    }
}

// all_of / any_of

/// How [`Combined`] folds its terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    All,
    Any,
}

/// `all_of` or `any_of` over a list of terms. Both short-circuit.
#[derive(Debug)]
pub struct Combined {
    pub combinator: Combinator,
    pub terms: Vec<Condition>,
}

pub const ALL_OF: ConditionConverter<Combined> =
    KeyedConverter::new("all_of", write_combined, read_all_of, erase_condition);

pub const ANY_OF: ConditionConverter<Combined> =
    KeyedConverter::new("any_of", write_combined, read_any_of, erase_condition);

fn write_combined(condition: &Combined, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    let terms = ctx.loader().conditions().serialize_list(&condition.terms, ctx)?;
    into.insert("terms".into(), terms);
    Ok(())
}

fn read_combined(node: &Node, combinator: Combinator, ctx: &Ctx<'_>) -> Result<Combined, ConversionError> {
    let map = node::require_map(Some(node), "terms")?;
    Ok(Combined {
        combinator,
        terms: read_terms(map, "terms", ctx)?,
    })
}

fn read_all_of(node: &Node, ctx: &Ctx<'_>) -> Result<Combined, ConversionError> {
    read_combined(node, Combinator::All, ctx)
}

fn read_any_of(node: &Node, ctx: &Ctx<'_>) -> Result<Combined, ConversionError> {
    read_combined(node, Combinator::Any, ctx)
}

impl LootCondition<ItemStack> for Combined {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        for term in &self.terms {
            let passed = term.verify(ctx)?;
            match self.combinator {
                Combinator::All if !passed => return Ok(false),
                Combinator::Any if passed => return Ok(true),
                _ => {}
            }
        }
        // an empty all_of passes, an empty any_of fails
        Ok(self.combinator == Combinator::All)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        match self.combinator {
            Combinator::All => Arc::new(ALL_OF),
            Combinator::Any => Arc::new(ANY_OF),
        }
    }
}

// has_information

/// Passes when any value is stored under `key`, whatever its type.
#[derive(Debug)]
pub struct HasInformation {
    pub key: String,
}

pub const HAS_INFORMATION: ConditionConverter<HasInformation> = KeyedConverter::new(
    "has_information",
    write_has_information,
    read_has_information,
    erase_condition,
);

fn write_has_information(
    condition: &HasInformation,
    into: &mut NodeMap,
    _: &Ctx<'_>,
) -> Result<(), ConversionError> {
    into.insert("key".into(), json!(condition.key));
    Ok(())
}

fn read_has_information(node: &Node, _: &Ctx<'_>) -> Result<HasInformation, ConversionError> {
    Ok(HasInformation {
        key: node::require_str(node.get("key"), "key")?.to_owned(),
    })
}

impl LootCondition<ItemStack> for HasInformation {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        Ok(ctx.information().contains_name(&self.key))
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(HAS_INFORMATION)
    }
}

// killed_by_player

#[derive(Debug)]
pub struct KilledByPlayer {
    pub inverse: Defaulted<bool>,
}

pub const KILLED_BY_PLAYER_CONDITION: ConditionConverter<KilledByPlayer> = KeyedConverter::new(
    "killed_by_player",
    write_killed_by_player,
    read_killed_by_player,
    erase_condition,
);

fn write_killed_by_player(
    condition: &KilledByPlayer,
    into: &mut NodeMap,
    _: &Ctx<'_>,
) -> Result<(), ConversionError> {
    condition.inverse.write(into, "inverse");
    Ok(())
}

fn read_killed_by_player(node: &Node, _: &Ctx<'_>) -> Result<KilledByPlayer, ConversionError> {
    Ok(KilledByPlayer {
        inverse: node::defaulted_bool(node.get("inverse"), "inverse", false)?,
    })
}

impl LootCondition<ItemStack> for KilledByPlayer {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        let killed = ctx.get(&KILLED_BY_PLAYER)?.copied().unwrap_or(false);
        Ok(killed != self.inverse.get())
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(KILLED_BY_PLAYER_CONDITION)
    }
}

// match_tool

/// Passes when the tool fact names one of `items`. No tool never matches.
#[derive(Debug)]
pub struct MatchTool {
    pub items: Vec<String>,
}

pub const MATCH_TOOL: ConditionConverter<MatchTool> =
    KeyedConverter::new("match_tool", write_match_tool, read_match_tool, erase_condition);

fn write_match_tool(condition: &MatchTool, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("items".into(), json!(condition.items));
    Ok(())
}

fn read_match_tool(node: &Node, _: &Ctx<'_>) -> Result<MatchTool, ConversionError> {
    let items = node::require_list(node.get("items"), "items")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            node::require_str(Some(item), &format!("items[{index}]")).map(str::to_owned)
        })
        .collect::<Result<_, _>>()?;
    Ok(MatchTool { items })
}

impl LootCondition<ItemStack> for MatchTool {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        Ok(ctx
            .get(&TOOL)?
            .is_some_and(|tool| self.items.iter().any(|item| item == tool)))
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(MATCH_TOOL)
    }
}

// survives_explosion

/// Passes with probability `1 / radius`; always passes without an explosion.
#[derive(Debug)]
pub struct SurvivesExplosion;

pub const SURVIVES_EXPLOSION: ConditionConverter<SurvivesExplosion> = KeyedConverter::new(
    "survives_explosion",
    write_survives_explosion,
    read_survives_explosion,
    erase_condition,
);

fn write_survives_explosion(
    _: &SurvivesExplosion,
    _: &mut NodeMap,
    _: &Ctx<'_>,
) -> Result<(), ConversionError> {
    Ok(())
}

fn read_survives_explosion(_: &Node, _: &Ctx<'_>) -> Result<SurvivesExplosion, ConversionError> {
    Ok(SurvivesExplosion)
}

impl LootCondition<ItemStack> for SurvivesExplosion {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        match ctx.get(&EXPLOSION_RADIUS)? {
            Some(&radius) if radius > 1.0 => Ok(ctx.random_f64() <= 1.0 / radius),
            _ => Ok(true),
        }
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn LootCondition<ItemStack>>> {
        Arc::new(SURVIVES_EXPLOSION)
    }
}

pub fn random_chance(chance: f64) -> Condition {
    erase_condition(RandomChance { chance })
}

pub fn inverted(term: Condition) -> Condition {
    erase_condition(Inverted { term })
}

pub fn all_of(terms: Vec<Condition>) -> Condition {
    erase_condition(Combined {
        combinator: Combinator::All,
        terms,
    })
}

pub fn any_of(terms: Vec<Condition>) -> Condition {
    erase_condition(Combined {
        combinator: Combinator::Any,
        terms,
    })
}

pub fn killed_by_player(inverse: bool) -> Condition {
    erase_condition(KilledByPlayer {
        inverse: Defaulted::new(false).with(inverse),
    })
}

pub fn match_tool(items: impl IntoIterator<Item = impl Into<String>>) -> Condition {
    erase_condition(MatchTool {
        items: items.into_iter().map(Into::into).collect(),
    })
}
