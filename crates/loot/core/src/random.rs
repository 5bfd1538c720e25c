//! Random sources for deterministic generation.
//!
//! A [`GenerationContext`](crate::context::GenerationContext) owns exactly one
//! [`RandomSource`]. Every weighted pick and every randomized provider during
//! one generation call draws from it in entry-traversal order, so a fixed seed
//! reproduces the same loot.

use std::collections::VecDeque;

/// A stream of random numbers.
pub trait RandomSource: Send {
    /// Next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    fn next_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "bound must be positive");
        self.next_u64() % bound.max(1)
    }

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        // 53 high bits fill the mantissa exactly
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_below(&mut self, bound: u64) -> u64 {
        (**self).next_below(bound)
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state; two outputs form one
/// `u64`. Same seed, same stream.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRandom {
    state: u64,
}

impl PcgRandom {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

impl RandomSource for PcgRandom {
    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }
}

/// Adapter for any [`rand`] generator.
#[derive(Clone, Debug)]
pub struct StdRandom<R> {
    rng: R,
}

impl<R: rand::RngCore + Send> StdRandom<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: rand::RngCore + Send> RandomSource for StdRandom<R> {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn next_below(&mut self, bound: u64) -> u64 {
        use rand::Rng;
        self.rng.gen_range(0..bound.max(1))
    }

    fn next_f64(&mut self) -> f64 {
        use rand::Rng;
        self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// `next_below(bound)` yields `draw % bound`, so a recorded list of weighted
/// pick positions replays the same picks.
#[derive(Clone, Debug)]
pub struct FixedRandom {
    draws: VecDeque<u64>,
}

impl FixedRandom {
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    pub fn new(draws: impl IntoIterator<Item = u64>) -> Self {
        let draws: VecDeque<u64> = draws.into_iter().collect();
        assert!(!draws.is_empty(), "FixedRandom needs at least one draw");
        Self { draws }
    }
}

impl RandomSource for FixedRandom {
    fn next_u64(&mut self) -> u64 {
        let draw = self.draws.pop_front().unwrap_or_default();
        self.draws.push_back(draw);
        draw
    }
}
