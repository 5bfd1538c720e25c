use std::sync::Arc;

use super::LootCondition;
use crate::context::{ConversionContext, GenerationContext};
use crate::convert::{ConversionError, NodeMap, node};
use crate::generate::GenerationError;

/// Field holding a structure's condition list.
pub const CONDITIONS_FIELD: &str = "conditions";

/// An ordered list of conditions gating some effect.
///
/// The effect only runs when every condition holds. Otherwise the input
/// passes through unchanged; a failing condition is never an error.
#[derive(Debug)]
pub struct ConditionalTransform<L> {
    conditions: Vec<Arc<dyn LootCondition<L>>>,
    /// The field was spelled out, possibly as an empty list.
    explicit: bool,
}

impl<L: 'static> ConditionalTransform<L> {
    pub fn new(conditions: Vec<Arc<dyn LootCondition<L>>>) -> Self {
        Self {
            conditions,
            explicit: false,
        }
    }

    /// No conditions: every test passes.
    pub fn always() -> Self {
        Self::new(Vec::new())
    }

    pub fn conditions(&self) -> &[Arc<dyn LootCondition<L>>] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// True iff every condition holds. Stops at the first failing one.
    pub fn test(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        for condition in &self.conditions {
            if !condition.verify(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs `effect` on `input` if the conditions hold, else returns `input`.
    pub fn apply<T>(
        &self,
        input: T,
        ctx: &GenerationContext,
        effect: impl FnOnce(T) -> Result<T, GenerationError>,
    ) -> Result<T, GenerationError> {
        if self.test(ctx)? {
            effect(input)
        } else {
            Ok(input)
        }
    }
}

impl<L: 'static> ConditionalTransform<L> {
    /// Writes the `conditions` field. Omitted when there are none, unless
    /// the source spelled out an empty list.
    pub fn serialize(
        &self,
        into: &mut NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<(), ConversionError> {
        if self.explicit || !self.conditions.is_empty() {
            let conditions = ctx
                .loader()
                .conditions()
                .serialize_list(&self.conditions, ctx)?;
            into.insert(CONDITIONS_FIELD.to_owned(), conditions);
        }
        Ok(())
    }

    /// Reads the `conditions` field of `map`. Absent means no conditions.
    pub fn deserialize(
        map: &NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Self, ConversionError> {
        let field = map.get(CONDITIONS_FIELD);
        let conditions = ctx
            .loader()
            .conditions()
            .deserialize_list(field, CONDITIONS_FIELD, ctx)?;
        Ok(Self {
            conditions,
            explicit: node::is_present(field),
        })
    }
}

impl<L: 'static> Clone for ConditionalTransform<L> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            explicit: self.explicit,
        }
    }
}

impl<L: 'static> Default for ConditionalTransform<L> {
    fn default() -> Self {
        Self::always()
    }
}
