//! Context consumed while generating loot.

use std::any::Any;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::{ContextError, Information, InformationBuilder, Key, LootContext, keys};
use crate::error::BuildError;
use crate::random::{PcgRandom, RandomSource};

/// Random source plus situational facts for one generation call.
///
/// The random source sits behind a mutex so the context can be shared by
/// reference through the whole entry tree (and across threads); draws still
/// happen in traversal order because generation itself is sequential.
pub struct GenerationContext {
    random: Mutex<Box<dyn RandomSource>>,
    information: Information,
}

impl GenerationContext {
    pub fn builder() -> GenerationContextBuilder {
        GenerationContextBuilder::default()
    }

    /// Runs `f` with exclusive access to the random source.
    pub fn with_random<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
        // A panic mid-draw leaves no invariant behind, so poisoning is ignored.
        let mut random = self.random.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **random)
    }

    /// Uniform integer in `[0, bound)`.
    pub fn random_below(&self, bound: u64) -> u64 {
        self.with_random(|random| random.next_below(bound))
    }

    /// Uniform float in `[0, 1)`.
    pub fn random_f64(&self) -> f64 {
        self.with_random(|random| random.next_f64())
    }

    /// Luck of whoever triggered this generation, 0 when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::TypeMismatch`] if `luck` was stored with another type.
    pub fn luck(&self) -> Result<f64, ContextError> {
        Ok(self.get(&keys::LUCK)?.copied().unwrap_or(0.0))
    }
}

impl LootContext for GenerationContext {
    fn information(&self) -> &Information {
        &self.information
    }
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("information", &self.information)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GenerationContext`]. A random source is required.
#[derive(Default)]
pub struct GenerationContextBuilder {
    random: Option<Box<dyn RandomSource>>,
    information: InformationBuilder,
}

impl GenerationContextBuilder {
    #[must_use]
    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    /// Uses a [`PcgRandom`] stream seeded with `seed`.
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        self.random(PcgRandom::new(seed))
    }

    #[must_use]
    pub fn with_information<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Self {
        self.information.insert(key, value);
        self
    }

    /// # Errors
    ///
    /// Returns [`BuildError::MissingRandom`] if no random source was given.
    pub fn build(self) -> Result<GenerationContext, BuildError> {
        let random = self.random.ok_or(BuildError::MissingRandom)?;
        Ok(GenerationContext {
            random: Mutex::new(random),
            information: self.information.build(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    const NAME: Key<String> = Key::new("name");

    #[test]
    fn build_requires_random() {
        let result = GenerationContext::builder()
            .with_information(&NAME, "value".to_string())
            .build();
        assert_eq!(result.unwrap_err(), BuildError::MissingRandom);
    }

    #[test]
    fn information_is_readable() {
        let context = GenerationContext::builder()
            .seed(1)
            .with_information(&NAME, "value".to_string())
            .build()
            .unwrap();

        assert_eq!(context.assure(&NAME).unwrap(), "value");
        assert_eq!(context.information().len(), 1);
    }

    #[test]
    fn draws_follow_the_source() {
        let context = GenerationContext::builder()
            .random(FixedRandom::new([0, 2, 3]))
            .build()
            .unwrap();

        assert_eq!(context.random_below(4), 0);
        assert_eq!(context.random_below(4), 2);
        assert_eq!(context.random_below(4), 3);
    }

    #[test]
    fn luck_defaults_to_zero() {
        let plain = GenerationContext::builder().seed(0).build().unwrap();
        assert_eq!(plain.luck().unwrap(), 0.0);

        let lucky = GenerationContext::builder()
            .seed(0)
            .with_information(&keys::LUCK, 2.5)
            .build()
            .unwrap();
        assert_eq!(lucky.luck().unwrap(), 2.5);
    }

    #[test]
    fn context_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<GenerationContext>();
    }
}
