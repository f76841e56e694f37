//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct is the single source of randomness for a
//! search run. It is seeded once, owned by the orchestrator and handed to the
//! genetic operators by mutable reference, so a fixed seed reproduces a run
//! regardless of how fitness evaluation is scheduled.
//!
//! ## Example
//!
//! ```rust
//! use hyperga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let depth = rng.gen_integer(2, 30);
//! let rate = rng.gen_real(0.0001, 0.1);
//!
//! assert!((2..=30).contains(&depth));
//! assert!((0.0001..=0.1).contains(&rate));
//! ```

use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

/// A wrapper around the `rand` crate's `StdRng` with the draws the search needs.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// Two generators built from the same seed produce the same sequence of draws.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws an integer uniformly from `[low, high]`, both ends inclusive.
    ///
    /// Callers guarantee `low <= high`.
    pub fn gen_integer(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    /// Draws a real number uniformly from `[low, high]`.
    ///
    /// Callers guarantee `low <= high` and that both bounds are finite.
    pub fn gen_real(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..=high)
    }

    /// Returns `true` with probability `p`.
    ///
    /// `p <= 0.0` never fires and `p >= 1.0` always fires. One draw is consumed
    /// either way, so the draw sequence does not depend on `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Draws `amount` distinct indices from `0..length` in random order.
    ///
    /// `amount` is clamped to `length`.
    pub fn sample_distinct(&mut self, length: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, length, amount.min(length)).into_vec()
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
