//! Registration of the built-in catalog.

use loot_core::{BuildError, LootLoader, LootLoaderBuilder};

use crate::config::LootConfig;
use crate::item::ItemStack;
use crate::{conditions, entries, modifiers, numbers};

/// Registers every built-in converter and default deserializer.
///
/// Converters registered on `builder` before this call with the same keys are
/// replaced; register overrides afterwards instead.
pub fn register_builtins(builder: LootLoaderBuilder<ItemStack>) -> LootLoaderBuilder<ItemStack> {
    builder
        .conditions(|registry| {
            registry
                .register(conditions::RANDOM_CHANCE)
                .register(conditions::INVERTED)
                .register(conditions::ALL_OF)
                .register(conditions::ANY_OF)
                .register(conditions::HAS_INFORMATION)
                .register(conditions::KILLED_BY_PLAYER_CONDITION)
                .register(conditions::MATCH_TOOL)
                .register(conditions::SURVIVES_EXPLOSION)
        })
        .number_providers(|registry| {
            registry
                .register(numbers::CONSTANT)
                .register(numbers::UNIFORM)
                .register(numbers::BINOMIAL)
                .default_deserializer(numbers::shorthand_number)
        })
        .modifiers(|registry| {
            registry
                .register(modifiers::SET_COUNT)
                .register(modifiers::SET_DAMAGE)
                .register(modifiers::SET_ENCHANTMENTS)
                .register(modifiers::LIMIT_COUNT)
                .register(modifiers::EXPLOSION_DECAY)
        })
        .entries(|registry| {
            registry
                .register(entries::ITEM)
                .register(entries::EMPTY)
                .default_deserializer(entries::shorthand_entry)
        })
}

/// A loader with the built-in catalog and the default discriminator.
pub fn builtin_loader() -> Result<LootLoader<ItemStack>, BuildError> {
    configured_loader(&LootConfig::default())
}

/// A loader with the built-in catalog and the configured discriminator.
pub fn configured_loader(config: &LootConfig) -> Result<LootLoader<ItemStack>, BuildError> {
    register_builtins(LootLoader::builder().element_name(config.element_name.as_str())).build()
}
