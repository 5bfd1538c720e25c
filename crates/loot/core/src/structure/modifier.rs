use std::fmt::Debug;
use std::sync::Arc;

use super::ConditionalTransform;
use crate::context::GenerationContext;
use crate::convert::{AsAny, Converter, Convertible};
use crate::generate::GenerationError;

/// Field holding a structure's modifier list.
pub const FUNCTIONS_FIELD: &str = "functions";

/// A conditional transformation of one generated item.
///
/// Implementors provide [`transform`](Self::transform); callers go through
/// [`apply`](Self::apply), which leaves the item untouched when the
/// modifier's own conditions fail.
pub trait LootModifier<L: 'static>: AsAny + Debug + Send + Sync {
    fn conditions(&self) -> &ConditionalTransform<L>;

    /// The unconditional effect.
    fn transform(&self, item: L, ctx: &GenerationContext) -> Result<L, GenerationError>;

    fn apply(&self, item: L, ctx: &GenerationContext) -> Result<L, GenerationError> {
        self.conditions()
            .apply(item, ctx, |item| self.transform(item, ctx))
    }

    fn converter(&self) -> Arc<dyn Converter<L, dyn LootModifier<L>>>;
}

impl<L: 'static> Convertible<L> for dyn LootModifier<L> {
    fn own_converter(&self) -> Arc<dyn Converter<L, Self>> {
        self.converter()
    }
}

pub fn erase_modifier<L: 'static, T: LootModifier<L> + 'static>(modifier: T) -> Arc<dyn LootModifier<L>> {
    Arc::new(modifier)
}

/// Applies every modifier, in order, to every item.
pub fn apply_modifiers<L: 'static>(
    modifiers: &[Arc<dyn LootModifier<L>>],
    items: Vec<L>,
    ctx: &GenerationContext,
) -> Result<Vec<L>, GenerationError> {
    if modifiers.is_empty() {
        return Ok(items);
    }
    items
        .into_iter()
        .map(|item| {
            modifiers
                .iter()
                .try_fold(item, |item, modifier| modifier.apply(item, ctx))
        })
        .collect()
}
