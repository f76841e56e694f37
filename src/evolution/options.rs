//! # SearchOptions
//!
//! The `SearchOptions` struct holds the tuning knobs of a search run that are not
//! part of an individual request: operator parameters, the seed, and how the
//! run parallelises and logs. The generation budget, population size and model
//! family are passed to [`GeneticSearch::run`](super::GeneticSearch::run) directly.
//!
//! ## Example
//!
//! ```rust
//! use hyperga::evolution::options::{LogLevel, SearchOptions};
//!
//! let options = SearchOptions::builder()
//!     .tournament_size(4)
//!     .mutation_rate(0.2)
//!     .seed(7)
//!     .log_level(LogLevel::Verbose)
//!     .build();
//!
//! assert_eq!(options.get_tournament_size(), 4);
//! assert!(options.validate().is_ok());
//!
//! let default_options = SearchOptions::default();
//! assert_eq!(default_options.get_seed(), 42);
//! ```
//!
//! ## Fields
//!
//! - `tournament_size`: Participants per selection tournament.
//! - `mutation_rate`: Probability of resampling each gene of a child.
//! - `top_k`: Number of best candidates kept in each generation record.
//! - `seed`: Seed of the run's random number generator.
//! - `parallel_threshold`: Population size from which evaluation runs on the rayon pool.
//! - `cache_evaluations`: Reuse evaluations of identical chromosomes within a run.
//! - `log_level`: How much per-generation detail is logged.

use crate::error::{Result, SearchError};
use crate::selection::tournament::DEFAULT_TOURNAMENT_SIZE;
use crate::strategy::DEFAULT_MUTATION_RATE;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Amount of per-generation logging.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// One summary line per generation plus every candidate at debug level.
    Verbose,
    /// One summary line per generation.
    Minimal,
    /// No per-generation logging.
    None,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SearchOptions {
    tournament_size: usize,
    mutation_rate: f64,
    top_k: usize,
    seed: u64,
    parallel_threshold: usize,
    cache_evaluations: bool,
    log_level: LogLevel,
}

impl SearchOptions {
    pub fn new(tournament_size: usize, mutation_rate: f64, seed: u64) -> Self {
        Self {
            tournament_size,
            mutation_rate,
            seed,
            ..Self::default()
        }
    }

    /// Checks that every option is usable.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.tournament_size < 1 {
            return Err(SearchError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SearchError::Configuration(format!(
                "Mutation rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.top_k < 1 {
            return Err(SearchError::Configuration(
                "Top-k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_tournament_size(&self) -> usize {
        self.tournament_size
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_top_k(&self) -> usize {
        self.top_k
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// Returns the population size from which evaluation runs in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn get_cache_evaluations(&self) -> bool {
        self.cache_evaluations
    }

    pub fn get_log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_tournament_size(&mut self, tournament_size: usize) {
        self.tournament_size = tournament_size;
    }

    pub fn set_mutation_rate(&mut self, mutation_rate: f64) {
        self.mutation_rate = mutation_rate;
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.top_k = top_k;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Sets the parallel threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    pub fn set_cache_evaluations(&mut self, enabled: bool) {
        self.cache_evaluations = enabled;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Returns a builder for creating a `SearchOptions` instance.
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            mutation_rate: DEFAULT_MUTATION_RATE,
            top_k: DEFAULT_TOP_K,
            seed: DEFAULT_SEED,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cache_evaluations: false,
            log_level: LogLevel::Minimal,
        }
    }
}

/// Builder for `SearchOptions`.
///
/// Unset fields take the values of `SearchOptions::default()`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptionsBuilder {
    tournament_size: Option<usize>,
    mutation_rate: Option<f64>,
    top_k: Option<usize>,
    seed: Option<u64>,
    parallel_threshold: Option<usize>,
    cache_evaluations: Option<bool>,
    log_level: Option<LogLevel>,
}

impl SearchOptionsBuilder {
    pub fn tournament_size(mut self, value: usize) -> Self {
        self.tournament_size = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    pub fn top_k(mut self, value: usize) -> Self {
        self.top_k = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Sets the parallel threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    pub fn cache_evaluations(mut self, value: bool) -> Self {
        self.cache_evaluations = Some(value);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Builds the `SearchOptions` instance.
    pub fn build(self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            tournament_size: self.tournament_size.unwrap_or(defaults.tournament_size),
            mutation_rate: self.mutation_rate.unwrap_or(defaults.mutation_rate),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            seed: self.seed.unwrap_or(defaults.seed),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(defaults.parallel_threshold),
            cache_evaluations: self
                .cache_evaluations
                .unwrap_or(defaults.cache_evaluations),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        }
    }
}
