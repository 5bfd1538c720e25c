//! Converter contract and per-category conversion registries.
//!
//! A converter knows one discriminator key and how to move one concrete type
//! between a [`Node`] and a category trait object (`dyn LootCondition<L>`,
//! `dyn LootEntry<L>`, ...). Registries dispatch on the discriminator when
//! reading; when writing they ask the value for its own converter through
//! [`Convertible`], so values serialize even if this registry never saw them.
mod error;
pub mod node;
mod registry;

pub use error::ConversionError;
pub use node::{Defaulted, Node, NodeKind, NodeMap, kind_of};
pub use registry::{ConversionRegistry, ConversionRegistryBuilder, DefaultDeserializer};

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::context::ConversionContext;

/// Bidirectional conversion for values of one category.
///
/// `V` is the category's trait object type. Implementations must be pure
/// functions of their inputs; the registry may call them from any thread.
pub trait Converter<L, V: ?Sized>: Send + Sync {
    /// Discriminator value written and read under the registry's element name.
    fn key(&self) -> &str;

    /// Name of the concrete type this converter handles. Bookkeeping only.
    fn value_type(&self) -> &'static str;

    /// Writes the value's fields onto `into`.
    ///
    /// `into` may already hold the discriminator. Implementations only add
    /// fields, they never clear or replace the map.
    fn serialize(
        &self,
        value: &V,
        into: &mut NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<(), ConversionError>;

    /// Reads a value from `node`.
    fn deserialize(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Arc<V>, ConversionError>;
}

/// Implemented by category trait objects: every value carries its converter.
pub trait Convertible<L> {
    fn own_converter(&self) -> Arc<dyn Converter<L, Self>>;
}

/// Upcast to [`Any`] so converters can recover the concrete type behind a
/// category trait object.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

type SerializeFn<L, T> =
    fn(&T, &mut NodeMap, &ConversionContext<'_, L>) -> Result<(), ConversionError>;
type DeserializeFn<L, T> = fn(&Node, &ConversionContext<'_, L>) -> Result<T, ConversionError>;

/// A converter assembled from plain functions over a concrete type `T`.
///
/// `erase` turns a `T` into the category object; it is almost always one of
/// the `erase_*` helpers in [`crate::structure`].
///
/// ```
/// use std::sync::Arc;
/// use loot_core::convert::{ConversionError, Converter, KeyedConverter, Node, NodeMap, node};
/// use loot_core::structure::{LootCondition, erase_condition};
/// use loot_core::{ConversionContext, GenerationContext, GenerationError};
///
/// #[derive(Debug)]
/// struct Always(bool);
///
/// fn write(always: &Always, into: &mut NodeMap, _: &ConversionContext<'_, String>) -> Result<(), ConversionError> {
///     into.insert("value".into(), always.0.into());
///     Ok(())
/// }
///
/// fn read(node: &Node, _: &ConversionContext<'_, String>) -> Result<Always, ConversionError> {
///     Ok(Always(node::require_bool(node.get("value"), "value")?))
/// }
///
/// const ALWAYS: KeyedConverter<String, Always, dyn LootCondition<String>> =
///     KeyedConverter::new("always", write, read, erase_condition);
///
/// impl LootCondition<String> for Always {
///     fn verify(&self, _: &GenerationContext) -> Result<bool, GenerationError> {
///         Ok(self.0)
///     }
///
///     fn converter(&self) -> Arc<dyn Converter<String, dyn LootCondition<String>>> {
///         Arc::new(ALWAYS)
///     }
/// }
///
/// assert_eq!(ALWAYS.key(), "always");
/// ```
pub struct KeyedConverter<L, T, V: ?Sized> {
    key: &'static str,
    serialize: SerializeFn<L, T>,
    deserialize: DeserializeFn<L, T>,
    erase: fn(T) -> Arc<V>,
}

impl<L, T, V: ?Sized> KeyedConverter<L, T, V> {
    pub const fn new(
        key: &'static str,
        serialize: SerializeFn<L, T>,
        deserialize: DeserializeFn<L, T>,
        erase: fn(T) -> Arc<V>,
    ) -> Self {
        Self {
            key,
            serialize,
            deserialize,
            erase,
        }
    }

    /// Reads a concrete `T` without erasing it.
    pub fn deserialize_concrete(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<T, ConversionError> {
        (self.deserialize)(node, ctx)
    }
}

impl<L, T, V: ?Sized> Clone for KeyedConverter<L, T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L, T, V: ?Sized> Copy for KeyedConverter<L, T, V> {}

impl<L, T, V: ?Sized> fmt::Debug for KeyedConverter<L, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedConverter")
            .field("key", &self.key)
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

impl<L, T, V> Converter<L, V> for KeyedConverter<L, T, V>
where
    T: Any,
    V: ?Sized + AsAny,
{
    fn key(&self) -> &str {
        self.key
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn serialize(
        &self,
        value: &V,
        into: &mut NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<(), ConversionError> {
        let concrete = value.as_any().downcast_ref::<T>().ok_or_else(|| {
            ConversionError::UnexpectedValue {
                key: self.key.to_owned(),
                expected: type_name::<T>(),
            }
        })?;
        (self.serialize)(concrete, into, ctx)
    }

    fn deserialize(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Arc<V>, ConversionError> {
        (self.deserialize)(node, ctx).map(self.erase)
    }
}
