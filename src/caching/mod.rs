//! # Caching Module
//!
//! Tournament selection regularly copies a strong chromosome into several
//! children, and with a low mutation rate many of them survive unchanged into
//! the next generation. Training is the expensive step of a search, so a run can
//! keep the evaluation of every distinct chromosome it has already seen.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::chromosome::Chromosome;
use crate::fitness::Evaluation;

/// A mutex-protected map from chromosome values to their evaluations.
///
/// Shared by reference across the evaluation workers of one run. Keys are the
/// exact gene values, so only bit-identical chromosomes hit.
#[derive(Default)]
pub struct EvaluationCache {
    entries: Mutex<HashMap<Vec<u64>, Evaluation>>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chromosome: &Chromosome) -> Option<Evaluation> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chromosome.cache_key())
            .cloned()
    }

    pub fn insert(&self, chromosome: &Chromosome, evaluation: Evaluation) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chromosome.cache_key(), evaluation);
    }

    /// Returns the number of cached evaluations.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the cache.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for EvaluationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationCache")
            .field("len", &self.len())
            .finish()
    }
}
