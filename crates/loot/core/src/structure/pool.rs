use std::sync::Arc;

use tracing::debug;

use super::{
    ConditionalTransform, FUNCTIONS_FIELD, LootEntry, LootItem, LootModifier, NumberProvider,
    apply_modifiers,
};
use crate::context::{ConversionContext, GenerationContext};
use crate::convert::{ConversionError, Node, NodeMap, node};
use crate::generate::{GenerationError, PickMode, WeightedPool};

/// A pool rolled a number of times, one weighted pick per roll.
///
/// The roll count is `rolls + floor(bonus_rolls * luck)`; a non-positive
/// count produces nothing and one above [`MAX_ROLLS`](Self::MAX_ROLLS) is an
/// error. Pool functions run on every produced item.
#[derive(Debug)]
pub struct LootPool<L> {
    rolls: Arc<dyn NumberProvider<L>>,
    bonus_rolls: Option<Arc<dyn NumberProvider<L>>>,
    entries: Vec<Arc<dyn LootEntry<L>>>,
    conditions: ConditionalTransform<L>,
    functions: Vec<Arc<dyn LootModifier<L>>>,
    explicit_functions: bool,
}

impl<L: 'static> LootPool<L> {
    pub const ROLLS_FIELD: &'static str = "rolls";
    pub const BONUS_ROLLS_FIELD: &'static str = "bonus_rolls";
    pub const ENTRIES_FIELD: &'static str = "entries";
    pub const MAX_ROLLS: i64 = 4096;

    pub fn new(rolls: Arc<dyn NumberProvider<L>>, entries: Vec<Arc<dyn LootEntry<L>>>) -> Self {
        Self {
            rolls,
            bonus_rolls: None,
            entries,
            conditions: ConditionalTransform::always(),
            functions: Vec::new(),
            explicit_functions: false,
        }
    }

    #[must_use]
    pub fn with_bonus_rolls(mut self, bonus_rolls: Arc<dyn NumberProvider<L>>) -> Self {
        self.bonus_rolls = Some(bonus_rolls);
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionalTransform<L>) -> Self {
        self.conditions = conditions;
        self
    }

    #[must_use]
    pub fn with_functions(mut self, functions: Vec<Arc<dyn LootModifier<L>>>) -> Self {
        self.functions = functions;
        self
    }

    pub fn entries(&self) -> &[Arc<dyn LootEntry<L>>] {
        &self.entries
    }

    pub fn conditions(&self) -> &ConditionalTransform<L> {
        &self.conditions
    }

    pub fn functions(&self) -> &[Arc<dyn LootModifier<L>>] {
        &self.functions
    }

    /// Number of picks for this generation.
    pub fn roll_count(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        let mut rolls = self.rolls.get_i64(ctx)?;
        if let Some(bonus) = &self.bonus_rolls {
            let luck = ctx.luck()?;
            if luck != 0.0 {
                rolls = rolls.saturating_add((bonus.get_f64(ctx)? * luck).floor() as i64);
            }
        }
        if rolls > Self::MAX_ROLLS {
            return Err(GenerationError::TooManyRolls {
                rolls,
                limit: Self::MAX_ROLLS,
            });
        }
        Ok(rolls)
    }

    pub fn generate(&self, ctx: &GenerationContext) -> Result<Vec<L>, GenerationError> {
        if !self.conditions.test(ctx)? {
            debug!("pool conditions failed, skipping");
            return Ok(Vec::new());
        }

        let rolls = self.roll_count(ctx)?;
        debug!(rolls, entries = self.entries.len(), "rolling pool");

        let mut items = Vec::new();
        for _ in 0..rolls.max(0) {
            // options are weighed against the context of each roll
            let pool = WeightedPool::collect(&self.entries, ctx)?;
            let picked = pool.generate(ctx, PickMode::Single)?;
            items.extend(apply_modifiers(&self.functions, picked, ctx)?);
        }
        Ok(items)
    }
}

impl<L: LootItem> LootPool<L> {
    pub fn serialize(&self, ctx: &ConversionContext<'_, L>) -> Result<Node, ConversionError> {
        let loader = ctx.loader();
        let mut map = NodeMap::new();

        map.insert(
            Self::ROLLS_FIELD.to_owned(),
            loader.number_providers().serialize(&*self.rolls, ctx)?,
        );
        if let Some(bonus) = &self.bonus_rolls {
            map.insert(
                Self::BONUS_ROLLS_FIELD.to_owned(),
                loader.number_providers().serialize(&**bonus, ctx)?,
            );
        }
        map.insert(
            Self::ENTRIES_FIELD.to_owned(),
            loader.entries().serialize_list(&self.entries, ctx)?,
        );
        self.conditions.serialize(&mut map, ctx)?;
        if self.explicit_functions || !self.functions.is_empty() {
            map.insert(
                FUNCTIONS_FIELD.to_owned(),
                loader.modifiers().serialize_list(&self.functions, ctx)?,
            );
        }
        Ok(Node::Object(map))
    }

    pub fn deserialize(node: &Node, ctx: &ConversionContext<'_, L>) -> Result<Self, ConversionError> {
        let loader = ctx.loader();
        let map = node::require_map(Some(node), "pool")?;

        let rolls = loader
            .number_providers()
            .deserialize(map.get(Self::ROLLS_FIELD), Self::ROLLS_FIELD, ctx)
            .map_err(|err| err.at(Self::ROLLS_FIELD))?;
        let bonus_rolls = match map.get(Self::BONUS_ROLLS_FIELD) {
            None | Some(Node::Null) => None,
            bonus => Some(
                loader
                    .number_providers()
                    .deserialize(bonus, Self::BONUS_ROLLS_FIELD, ctx)
                    .map_err(|err| err.at(Self::BONUS_ROLLS_FIELD))?,
            ),
        };
        let entries = map.get(Self::ENTRIES_FIELD);
        node::require_list(entries, Self::ENTRIES_FIELD)?;
        let entries = loader
            .entries()
            .deserialize_list(entries, Self::ENTRIES_FIELD, ctx)?;
        let conditions = ConditionalTransform::deserialize(map, ctx)?;
        let functions = map.get(FUNCTIONS_FIELD);
        let explicit_functions = node::is_present(functions);
        let functions = loader
            .modifiers()
            .deserialize_list(functions, FUNCTIONS_FIELD, ctx)?;

        Ok(Self {
            rolls,
            bonus_rolls,
            entries,
            conditions,
            functions,
            explicit_functions,
        })
    }
}
