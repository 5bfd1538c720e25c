//! Weighted pool resolution.
//!
//! A pool is built fresh for every roll: entries expand into options in
//! encounter order, each option reports its weight for this context, and a
//! single draw in `[0, total)` picks the first option whose cumulative upper
//! bound exceeds it.
//!
//! ```text
//! weights   1     2        1
//! bounds  [0,1) [1,3)    [3,4)
//! draw      0 -> 0,  2 -> 1,  3 -> 2
//! ```
mod error;

pub use error::GenerationError;

use std::sync::Arc;

use tracing::trace;

use crate::context::GenerationContext;
use crate::structure::{LootEntry, LootOption};

/// How many options a resolution generates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickMode {
    /// One weighted pick.
    #[default]
    Single,
    /// Every surviving option, in encounter order.
    All,
}

struct Candidate<'a, L> {
    /// Exclusive cumulative bound.
    upper: u64,
    option: &'a dyn LootOption<L>,
}

/// The flattened candidate list of one resolution.
pub struct WeightedPool<'a, L> {
    candidates: Vec<Candidate<'a, L>>,
    total_weight: u64,
}

impl<'a, L: 'static> WeightedPool<'a, L> {
    /// Expands `entries` against `ctx` and weighs every surviving option.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidWeight`] for any weight below 1,
    /// located at the entry that offered it (`entries[2]`).
    pub fn collect(
        entries: &'a [Arc<dyn LootEntry<L>>],
        ctx: &GenerationContext,
    ) -> Result<Self, GenerationError> {
        let mut pool = Self::empty();
        for (index, entry) in entries.iter().enumerate() {
            let located = |err: GenerationError| err.at(format!("entries[{index}]"));
            for option in entry.request_options(ctx).map_err(located)? {
                pool.push(option, ctx).map_err(located)?;
            }
        }
        Ok(pool)
    }

    /// Weighs already expanded options.
    pub fn from_options(
        options: impl IntoIterator<Item = &'a dyn LootOption<L>>,
        ctx: &GenerationContext,
    ) -> Result<Self, GenerationError> {
        let mut pool = Self::empty();
        for option in options {
            pool.push(option, ctx)?;
        }
        Ok(pool)
    }

    fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            total_weight: 0,
        }
    }

    fn push(&mut self, option: &'a dyn LootOption<L>, ctx: &GenerationContext) -> Result<(), GenerationError> {
        let weight = option.weight(ctx)?;
        if weight < 1 {
            return Err(GenerationError::InvalidWeight { weight });
        }
        self.total_weight = self
            .total_weight
            .checked_add(weight.unsigned_abs())
            .ok_or_else(|| GenerationError::invalid("total pool weight overflows"))?;
        self.candidates.push(Candidate {
            upper: self.total_weight,
            option,
        });
        Ok(())
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index and option selected by `draw`, which must be below the total.
    pub fn select(&self, draw: u64) -> Option<(usize, &'a dyn LootOption<L>)> {
        self.candidates
            .iter()
            .position(|candidate| candidate.upper > draw)
            .map(|index| (index, self.candidates[index].option))
    }

    /// Draws once from `ctx` and selects an option.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::EmptyPool`] when no option survived.
    pub fn pick(&self, ctx: &GenerationContext) -> Result<&'a dyn LootOption<L>, GenerationError> {
        if self.is_empty() {
            return Err(GenerationError::EmptyPool);
        }
        let draw = ctx.random_below(self.total_weight);
        let (index, option) = self.select(draw).ok_or(GenerationError::EmptyPool)?;
        trace!(draw, index, total_weight = self.total_weight, "picked option");
        Ok(option)
    }

    /// Generates items according to `mode`.
    pub fn generate(
        &self,
        ctx: &GenerationContext,
        mode: PickMode,
    ) -> Result<Vec<L>, GenerationError> {
        match mode {
            PickMode::Single => self.pick(ctx)?.generate(ctx),
            PickMode::All => {
                if self.is_empty() {
                    return Err(GenerationError::EmptyPool);
                }
                let mut items = Vec::new();
                for candidate in &self.candidates {
                    items.extend(candidate.option.generate(ctx)?);
                }
                Ok(items)
            }
        }
    }
}

/// Builds a pool from `entries` and generates from it in one step.
pub fn resolve<L: 'static>(
    entries: &[Arc<dyn LootEntry<L>>],
    ctx: &GenerationContext,
    mode: PickMode,
) -> Result<Vec<L>, GenerationError> {
    WeightedPool::collect(entries, ctx)?.generate(ctx, mode)
}
