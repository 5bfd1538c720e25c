use std::fmt::Debug;
use std::sync::Arc;

use super::{ConditionalTransform, FUNCTIONS_FIELD, LootModifier, apply_modifiers};
use crate::context::{ConversionContext, GenerationContext};
use crate::convert::{AsAny, ConversionError, Converter, Convertible, Defaulted, NodeMap, node};
use crate::generate::GenerationError;

/// A weighted candidate in a pool.
pub trait LootOption<L: 'static> {
    /// Selection weight for this resolution. Must be at least 1.
    fn weight(&self, ctx: &GenerationContext) -> Result<i64, GenerationError>;

    /// Produces the items of this option once it has been picked.
    fn generate(&self, ctx: &GenerationContext) -> Result<Vec<L>, GenerationError>;
}

/// A node of the entry tree.
///
/// Terminal entries offer themselves as a single option (or nothing, when
/// their conditions fail). Composite entries flatten their children, see
/// [`CompositeEntry`](super::CompositeEntry).
pub trait LootEntry<L: 'static>: AsAny + Debug + Send + Sync {
    fn request_options<'a>(
        &'a self,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<L>>, GenerationError>;

    fn converter(&self) -> Arc<dyn Converter<L, dyn LootEntry<L>>>;
}

impl<L: 'static> Convertible<L> for dyn LootEntry<L> {
    fn own_converter(&self) -> Arc<dyn Converter<L, Self>> {
        self.converter()
    }
}

pub fn erase_entry<L: 'static, T: LootEntry<L> + 'static>(entry: T) -> Arc<dyn LootEntry<L>> {
    Arc::new(entry)
}

/// Base weight plus a luck-scaled quality bonus.
///
/// The effective weight is `weight + floor(quality * luck)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryWeight {
    weight: Defaulted<i64>,
    quality: Defaulted<i64>,
}

impl EntryWeight {
    pub const WEIGHT_FIELD: &'static str = "weight";
    pub const QUALITY_FIELD: &'static str = "quality";

    pub fn new(weight: i64, quality: i64) -> Self {
        Self {
            weight: Defaulted::new(1).with(weight),
            quality: Defaulted::new(0).with(quality),
        }
    }

    pub fn weight(&self) -> i64 {
        self.weight.get()
    }

    pub fn quality(&self) -> i64 {
        self.quality.get()
    }

    pub fn compute(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        let (weight, quality) = (self.weight(), self.quality());
        if quality == 0 {
            return Ok(weight);
        }
        let bonus = (quality as f64 * ctx.luck()?).floor() as i64;
        Ok(weight.saturating_add(bonus))
    }

    /// Writes fields that differ from their defaults or were read explicitly.
    pub fn serialize(&self, into: &mut NodeMap) {
        self.weight.write(into, Self::WEIGHT_FIELD);
        self.quality.write(into, Self::QUALITY_FIELD);
    }

    pub fn deserialize(map: &NodeMap) -> Result<Self, ConversionError> {
        Ok(Self {
            weight: node::defaulted_i64(map.get(Self::WEIGHT_FIELD), Self::WEIGHT_FIELD, 1)?,
            quality: node::defaulted_i64(map.get(Self::QUALITY_FIELD), Self::QUALITY_FIELD, 0)?,
        })
    }
}

impl Default for EntryWeight {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Shared state of terminal entries: weight, conditions and modifiers.
///
/// A terminal entry embeds one of these and implements both [`LootEntry`] and
/// [`LootOption`] for itself:
///
/// ```ignore
/// fn request_options<'a>(&'a self, ctx: &GenerationContext) -> Result<Vec<&'a dyn LootOption<L>>, _> {
///     self.terminal.options(self, ctx)
/// }
/// ```
#[derive(Debug)]
pub struct TerminalEntry<L> {
    weight: EntryWeight,
    conditions: ConditionalTransform<L>,
    modifiers: Vec<Arc<dyn LootModifier<L>>>,
    /// `functions` was spelled out, possibly as an empty list.
    explicit_functions: bool,
}

impl<L: 'static> TerminalEntry<L> {
    pub fn new() -> Self {
        Self {
            weight: EntryWeight::default(),
            conditions: ConditionalTransform::always(),
            modifiers: Vec::new(),
            explicit_functions: false,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: EntryWeight) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionalTransform<L>) -> Self {
        self.conditions = conditions;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<Arc<dyn LootModifier<L>>>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn entry_weight(&self) -> EntryWeight {
        self.weight
    }

    pub fn conditions(&self) -> &ConditionalTransform<L> {
        &self.conditions
    }

    pub fn modifiers(&self) -> &[Arc<dyn LootModifier<L>>] {
        &self.modifiers
    }

    /// `option` alone if the conditions hold, nothing otherwise.
    pub fn options<'a>(
        &self,
        option: &'a dyn LootOption<L>,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<L>>, GenerationError> {
        if self.conditions.test(ctx)? {
            Ok(vec![option])
        } else {
            Ok(Vec::new())
        }
    }

    pub fn weight(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        self.weight.compute(ctx)
    }

    /// Runs the entry's modifiers over freshly generated items.
    pub fn finish(&self, items: Vec<L>, ctx: &GenerationContext) -> Result<Vec<L>, GenerationError> {
        apply_modifiers(&self.modifiers, items, ctx)
    }
}

impl<L: 'static> TerminalEntry<L> {
    pub fn serialize(
        &self,
        into: &mut NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<(), ConversionError> {
        self.weight.serialize(into);
        self.conditions.serialize(into, ctx)?;
        if self.explicit_functions || !self.modifiers.is_empty() {
            let functions = ctx
                .loader()
                .modifiers()
                .serialize_list(&self.modifiers, ctx)?;
            into.insert(FUNCTIONS_FIELD.to_owned(), functions);
        }
        Ok(())
    }

    pub fn deserialize(map: &NodeMap, ctx: &ConversionContext<'_, L>) -> Result<Self, ConversionError> {
        let functions = map.get(FUNCTIONS_FIELD);
        let modifiers = ctx
            .loader()
            .modifiers()
            .deserialize_list(functions, FUNCTIONS_FIELD, ctx)?;
        Ok(Self {
            weight: EntryWeight::deserialize(map)?,
            conditions: ConditionalTransform::deserialize(map, ctx)?,
            modifiers,
            explicit_functions: node::is_present(functions),
        })
    }
}

impl<L: 'static> Default for TerminalEntry<L> {
    fn default() -> Self {
        Self::new()
    }
}
