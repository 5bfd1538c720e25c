//! Typed, immutable information passed through conversion and generation.
//!
//! A [`Key`] pairs a name with a value type. Contexts store values under the
//! key's *name* only, so two keys with the same name and different types
//! address the same slot:
//!
//! - last insert wins in [`InformationBuilder`]
//! - reading through the other key fails with [`ContextError::TypeMismatch`]
//!
//! Absence is never an error for [`LootContext::get`]; presence with the wrong
//! type always is.
//!
//! Two context flavors share the [`LootContext`] lookup contract:
//! [`ConversionContext`] (carries the owning loader) and [`GenerationContext`]
//! (carries the random source).
mod conversion;
mod error;
mod generation;

pub use conversion::{ConversionContext, ConversionContextBuilder};
pub use error::ContextError;
pub use generation::{GenerationContext, GenerationContextBuilder};

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Well-known keys understood by the machinery in this crate.
pub mod keys {
    use super::Key;

    /// Luck of whoever triggered the generation.
    ///
    /// Scales entry quality and pool bonus rolls; absent means 0.
    pub const LUCK: Key<f64> = Key::new("luck");
}

/// A named, typed slot in a context.
///
/// Equality and hashing only look at the name.
pub struct Key<T> {
    name: Cow<'static, str>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Creates a key with a static name, usable in `const` items.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    /// Creates a key from a runtime name (e.g. one read from a document).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}: {})", self.name, self.type_name())
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<T, U> PartialEq<Key<U>> for Key<T> {
    fn eq(&self, other: &Key<U>) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Key<T> {}

impl<T> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Clone)]
struct Stored {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Immutable map of typed information.
///
/// Built once through [`InformationBuilder`]; there is no way to change it
/// afterwards:
///
/// ```compile_fail
/// use loot_core::context::{InformationBuilder, Key};
///
/// const NAME: Key<String> = Key::new("name");
/// let information = InformationBuilder::new()
///     .with_information(&NAME, "value".to_string())
///     .build();
/// information.insert(&NAME, "new_value".to_string());
/// ```
#[derive(Clone, Default)]
pub struct Information {
    values: HashMap<String, Stored>,
}

impl Information {
    /// An information map without any values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> InformationBuilder {
        InformationBuilder::new()
    }

    /// Returns true if any value is stored under the key's name.
    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.values.contains_key(key.name())
    }

    /// Returns true if any value is stored under `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Reads the value stored under the key's name.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::TypeMismatch`] if the stored value is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<Option<&T>, ContextError> {
        let Some(stored) = self.values.get(key.name()) else {
            return Ok(None);
        };
        stored
            .value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| ContextError::TypeMismatch {
                key: key.name().to_owned(),
                expected: key.type_name(),
                found: stored.type_name,
            })
    }

    /// Reads a value that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingValue`] when absent and propagates
    /// [`ContextError::TypeMismatch`] from [`Information::get`].
    pub fn assure<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<&T, ContextError> {
        self.get(key)?.ok_or_else(|| ContextError::MissingValue {
            key: key.name().to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of all stored values, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for Information {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(name, stored)| (name, stored.type_name)))
            .finish()
    }
}

/// Accumulates typed values before freezing them into an [`Information`].
#[derive(Clone, Default)]
pub struct InformationBuilder {
    values: HashMap<String, Stored>,
}

impl InformationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the key's name, replacing anything stored under
    /// the same name regardless of its type.
    #[must_use]
    pub fn with_information<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    pub(crate) fn insert<T: Any + Send + Sync>(&mut self, key: &Key<T>, value: T) {
        self.values.insert(
            key.name().to_owned(),
            Stored {
                value: Arc::new(value),
                type_name: std::any::type_name::<T>(),
            },
        );
    }

    pub fn build(self) -> Information {
        Information {
            values: self.values,
        }
    }
}

/// Read-only keyed lookup shared by every context flavor.
pub trait LootContext {
    /// The frozen information of this context.
    fn information(&self) -> &Information;

    /// Returns true if a value is stored under a key equal to `key`.
    fn has<T>(&self, key: &Key<T>) -> bool {
        self.information().contains(key)
    }

    /// Returns the stored value, `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::TypeMismatch`] if the value has another type.
    fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<Option<&T>, ContextError> {
        self.information().get(key)
    }

    /// Returns the stored value, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingValue`] or [`ContextError::TypeMismatch`].
    fn assure<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<&T, ContextError> {
        self.information().assure(key)
    }
}

impl LootContext for Information {
    fn information(&self) -> &Information {
        self
    }
}
