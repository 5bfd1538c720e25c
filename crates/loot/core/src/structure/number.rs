use std::fmt::Debug;
use std::sync::Arc;

use crate::context::GenerationContext;
use crate::convert::{AsAny, Converter, Convertible};
use crate::generate::GenerationError;

/// A possibly random number drawn from the generation context.
pub trait NumberProvider<L: 'static>: AsAny + Debug + Send + Sync {
    fn get_f64(&self, ctx: &GenerationContext) -> Result<f64, GenerationError>;

    /// The value rounded to the nearest integer.
    fn get_i64(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        Ok(self.get_f64(ctx)?.round() as i64)
    }

    fn converter(&self) -> Arc<dyn Converter<L, dyn NumberProvider<L>>>;
}

impl<L: 'static> Convertible<L> for dyn NumberProvider<L> {
    fn own_converter(&self) -> Arc<dyn Converter<L, Self>> {
        self.converter()
    }
}

pub fn erase_number<L: 'static, T: NumberProvider<L> + 'static>(provider: T) -> Arc<dyn NumberProvider<L>> {
    Arc::new(provider)
}
