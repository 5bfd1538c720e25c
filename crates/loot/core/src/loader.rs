//! The loader: owner of every conversion registry.
//!
//! One loader is built at startup and passed by reference to every conversion
//! (inside a [`ConversionContext`]). There is no global instance.
//!
//! # Usage
//!
//! ```
//! use loot_core::LootLoader;
//!
//! let loader = LootLoader::<String>::builder()
//!     .element_name("type")
//!     .build()
//!     .unwrap();
//!
//! // composites are available out of the box
//! assert_eq!(loader.entries().keys(), vec!["alternatives", "group", "sequence"]);
//! ```

use std::fmt;

use crate::context::ConversionContext;
use crate::convert::{ConversionRegistry, ConversionRegistryBuilder};
use crate::error::BuildError;
use crate::structure::{
    LootCondition, LootEntry, LootItem, LootModifier, NumberProvider, composite_converters,
};

pub type ConditionRegistry<L> = ConversionRegistry<L, dyn LootCondition<L>>;
pub type NumberProviderRegistry<L> = ConversionRegistry<L, dyn NumberProvider<L>>;
pub type ModifierRegistry<L> = ConversionRegistry<L, dyn LootModifier<L>>;
pub type EntryRegistry<L> = ConversionRegistry<L, dyn LootEntry<L>>;

/// Aggregate of the four category registries.
pub struct LootLoader<L> {
    conditions: ConditionRegistry<L>,
    number_providers: NumberProviderRegistry<L>,
    modifiers: ModifierRegistry<L>,
    entries: EntryRegistry<L>,
}

impl<L> LootLoader<L> {
    pub fn conditions(&self) -> &ConditionRegistry<L> {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut ConditionRegistry<L> {
        &mut self.conditions
    }

    pub fn number_providers(&self) -> &NumberProviderRegistry<L> {
        &self.number_providers
    }

    pub fn number_providers_mut(&mut self) -> &mut NumberProviderRegistry<L> {
        &mut self.number_providers
    }

    pub fn modifiers(&self) -> &ModifierRegistry<L> {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierRegistry<L> {
        &mut self.modifiers
    }

    pub fn entries(&self) -> &EntryRegistry<L> {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut EntryRegistry<L> {
        &mut self.entries
    }

    /// A conversion context with no extra information.
    pub fn conversion_context(&self) -> ConversionContext<'_, L> {
        ConversionContext::new(self)
    }
}

impl<L: LootItem> LootLoader<L> {
    /// A builder whose entry registry already holds the composite entries.
    pub fn builder() -> LootLoaderBuilder<L> {
        let mut entries: ConversionRegistryBuilder<L, dyn LootEntry<L>> =
            ConversionRegistry::builder("entries");
        for converter in composite_converters() {
            entries = entries.register(converter);
        }

        LootLoaderBuilder {
            element_name: None,
            conditions: ConversionRegistry::builder("conditions"),
            number_providers: ConversionRegistry::builder("number_providers"),
            modifiers: ConversionRegistry::builder("modifiers"),
            entries,
        }
    }
}

impl<L> fmt::Debug for LootLoader<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LootLoader")
            .field("conditions", &self.conditions)
            .field("number_providers", &self.number_providers)
            .field("modifiers", &self.modifiers)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Builder for [`LootLoader`].
///
/// [`element_name`](Self::element_name) sets the discriminator for every
/// category that does not configure its own.
pub struct LootLoaderBuilder<L> {
    element_name: Option<String>,
    conditions: ConversionRegistryBuilder<L, dyn LootCondition<L>>,
    number_providers: ConversionRegistryBuilder<L, dyn NumberProvider<L>>,
    modifiers: ConversionRegistryBuilder<L, dyn LootModifier<L>>,
    entries: ConversionRegistryBuilder<L, dyn LootEntry<L>>,
}

impl<L: LootItem> LootLoaderBuilder<L> {
    #[must_use]
    pub fn element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn conditions(
        mut self,
        configure: impl FnOnce(
            ConversionRegistryBuilder<L, dyn LootCondition<L>>,
        ) -> ConversionRegistryBuilder<L, dyn LootCondition<L>>,
    ) -> Self {
        self.conditions = configure(self.conditions);
        self
    }

    #[must_use]
    pub fn number_providers(
        mut self,
        configure: impl FnOnce(
            ConversionRegistryBuilder<L, dyn NumberProvider<L>>,
        ) -> ConversionRegistryBuilder<L, dyn NumberProvider<L>>,
    ) -> Self {
        self.number_providers = configure(self.number_providers);
        self
    }

    #[must_use]
    pub fn modifiers(
        mut self,
        configure: impl FnOnce(
            ConversionRegistryBuilder<L, dyn LootModifier<L>>,
        ) -> ConversionRegistryBuilder<L, dyn LootModifier<L>>,
    ) -> Self {
        self.modifiers = configure(self.modifiers);
        self
    }

    #[must_use]
    pub fn entries(
        mut self,
        configure: impl FnOnce(
            ConversionRegistryBuilder<L, dyn LootEntry<L>>,
        ) -> ConversionRegistryBuilder<L, dyn LootEntry<L>>,
    ) -> Self {
        self.entries = configure(self.entries);
        self
    }

    /// # Errors
    ///
    /// Returns [`BuildError::MissingElementName`] naming the first category
    /// left without a discriminator field.
    pub fn build(self) -> Result<LootLoader<L>, BuildError> {
        let default = self.element_name.as_deref();
        Ok(LootLoader {
            conditions: self.conditions.element_name_or(default).build()?,
            number_providers: self.number_providers.element_name_or(default).build()?,
            modifiers: self.modifiers.element_name_or(default).build()?,
            entries: self.entries.element_name_or(default).build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_name_is_required() {
        let err = LootLoader::<String>::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingElementName { category: "conditions" });
    }

    #[test]
    fn categories_may_override_the_element_name() {
        let loader = LootLoader::<String>::builder()
            .element_name("type")
            .number_providers(|registry| registry.element_name("kind"))
            .build()
            .unwrap();

        assert_eq!(loader.conditions().element_name(), "type");
        assert_eq!(loader.number_providers().element_name(), "kind");
        assert_eq!(loader.entries().category(), "entries");
    }

    #[test]
    fn per_category_names_suffice() {
        let loader = LootLoader::<String>::builder()
            .conditions(|r| r.element_name("condition"))
            .number_providers(|r| r.element_name("type"))
            .modifiers(|r| r.element_name("function"))
            .entries(|r| r.element_name("type"))
            .build()
            .unwrap();
        assert_eq!(loader.modifiers().element_name(), "function");
    }

    #[test]
    fn registries_can_change_after_build() {
        let mut loader = LootLoader::<String>::builder()
            .element_name("type")
            .build()
            .unwrap();

        assert!(loader.entries_mut().unregister("group"));
        assert_eq!(loader.entries().keys(), vec!["alternatives", "sequence"]);
    }

    #[test]
    fn loader_is_shareable() {
        fn assert_shareable<T: Send + Sync>() {}
        assert_shareable::<LootLoader<String>>();
    }
}
