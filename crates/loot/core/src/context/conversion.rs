//! Context consumed while converting between nodes and loot structures.

use std::any::Any;
use std::fmt;

use super::{Information, InformationBuilder, Key, LootContext};
use crate::error::BuildError;
use crate::loader::LootLoader;

/// The owning loader plus arbitrary conversion facts.
///
/// Converters reach every other registry through [`ConversionContext::loader`],
/// which is how nested structures (conditions inside entries, providers inside
/// functions) get deserialized.
pub struct ConversionContext<'a, L> {
    loader: &'a LootLoader<L>,
    information: Information,
}

impl<'a, L> ConversionContext<'a, L> {
    /// A context carrying only the loader.
    pub fn new(loader: &'a LootLoader<L>) -> Self {
        Self {
            loader,
            information: Information::empty(),
        }
    }

    pub fn builder() -> ConversionContextBuilder<'a, L> {
        ConversionContextBuilder {
            loader: None,
            information: InformationBuilder::new(),
        }
    }

    pub fn loader(&self) -> &'a LootLoader<L> {
        self.loader
    }
}

impl<L> LootContext for ConversionContext<'_, L> {
    fn information(&self) -> &Information {
        &self.information
    }
}

impl<L> fmt::Debug for ConversionContext<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("information", &self.information)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConversionContext`]. A loader is required.
pub struct ConversionContextBuilder<'a, L> {
    loader: Option<&'a LootLoader<L>>,
    information: InformationBuilder,
}

impl<'a, L> ConversionContextBuilder<'a, L> {
    #[must_use]
    pub fn loader(mut self, loader: &'a LootLoader<L>) -> Self {
        self.loader = Some(loader);
        self
    }

    #[must_use]
    pub fn with_information<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Self {
        self.information.insert(key, value);
        self
    }

    /// # Errors
    ///
    /// Returns [`BuildError::MissingLoader`] if no loader was given.
    pub fn build(self) -> Result<ConversionContext<'a, L>, BuildError> {
        let loader = self.loader.ok_or(BuildError::MissingLoader)?;
        Ok(ConversionContext {
            loader,
            information: self.information.build(),
        })
    }
}
