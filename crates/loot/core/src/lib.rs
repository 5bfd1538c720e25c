//! Registry-driven loot tables: conversion, contexts and weighted resolution.
//!
//! `loot-core` turns declarative nodes into an executable object graph and
//! back, then evaluates that graph against a [`GenerationContext`] to produce
//! items of the host's type `L`. Concrete conditions, providers, modifiers
//! and terminal entries live outside this crate and plug in through the
//! per-category registries owned by a [`LootLoader`].
pub mod context;
pub mod convert;
pub mod error;
pub mod generate;
pub mod loader;
pub mod random;
pub mod structure;

pub use context::{
    ContextError, ConversionContext, ConversionContextBuilder, GenerationContext,
    GenerationContextBuilder, Information, InformationBuilder, Key, LootContext,
};
pub use convert::{
    AsAny, ConversionError, ConversionRegistry, ConversionRegistryBuilder, Converter, Convertible,
    Defaulted, KeyedConverter, Node, NodeKind, NodeMap,
};
pub use error::{BuildError, ErrorSeverity, LootError};
pub use generate::{GenerationError, PickMode, WeightedPool};
pub use loader::{LootLoader, LootLoaderBuilder};
pub use random::{FixedRandom, PcgRandom, RandomSource, StdRandom};
pub use structure::{
    CompositeEntry, CompositeKind, ConditionalTransform, EntryWeight, LootCondition, LootEntry,
    LootItem, LootModifier, LootOption, LootPool, LootTable, NumberProvider, TerminalEntry,
};
