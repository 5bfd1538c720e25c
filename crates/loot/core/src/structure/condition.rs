use std::fmt::Debug;
use std::sync::Arc;

use crate::context::GenerationContext;
use crate::convert::{AsAny, Converter, Convertible};
use crate::generate::GenerationError;

/// A predicate over the generation context.
///
/// A condition that evaluates to `false` is an ordinary outcome; errors are
/// reserved for broken contexts (a fact stored with the wrong type).
pub trait LootCondition<L: 'static>: AsAny + Debug + Send + Sync {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError>;

    fn converter(&self) -> Arc<dyn Converter<L, dyn LootCondition<L>>>;
}

impl<L: 'static> Convertible<L> for dyn LootCondition<L> {
    fn own_converter(&self) -> Arc<dyn Converter<L, Self>> {
        self.converter()
    }
}

pub fn erase_condition<L: 'static, T: LootCondition<L> + 'static>(condition: T) -> Arc<dyn LootCondition<L>> {
    Arc::new(condition)
}
