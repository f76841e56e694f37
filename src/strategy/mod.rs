//! # BreedStrategy
//!
//! The `BreedStrategy` trait defines the interface for strategies responsible for breeding
//! the next population from the parents chosen by selection.
pub mod single_point;

use std::fmt::Debug;

use crate::{
    chromosome::Chromosome, error::Result, rng::RandomNumberGenerator,
    schema::HyperparameterRange,
};

/// # BreedStrategy
///
/// Produces the next generation from an ordered list of selected parents.
pub trait BreedStrategy
where
    Self: Debug + Clone + Send + Sync,
{
    /// Breeds exactly `population_size` children.
    ///
    /// ## Parameters
    ///
    /// - `parents`: The selected parents, in selection order.
    /// - `ranges`: The ranges of the active model family, used to resample genes.
    /// - `population_size`: The number of children to produce.
    /// - `rng`: The run's random number generator.
    ///
    /// ## Errors
    ///
    /// This method can fail if:
    /// - The parents slice is empty
    /// - Two paired parents do not share the same gene order
    fn breed(
        &self,
        parents: &[Chromosome],
        ranges: &[HyperparameterRange],
        population_size: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>>;
}

pub use single_point::{SinglePointBreeding, DEFAULT_MUTATION_RATE};
