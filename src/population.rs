//! # Population Factory
//!
//! Builds random chromosomes and whole populations for one model family.
//!
//! ```rust
//! use hyperga::population::PopulationFactory;
//! use hyperga::rng::RandomNumberGenerator;
//! use hyperga::schema::{families, HyperparameterSchema};
//!
//! let schema = HyperparameterSchema::standard();
//! let factory = PopulationFactory::new(&schema, families::RANDOM_FOREST).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(42);
//!
//! let population = factory.create_population(10, &mut rng);
//! assert_eq!(population.len(), 10);
//! ```

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::rng::RandomNumberGenerator;
use crate::schema::{HyperparameterRange, HyperparameterSchema};

/// The chromosomes evaluated in one generation, in order.
pub type Population = Vec<Chromosome>;

/// Draws chromosomes from the ranges of a single model family.
#[derive(Debug, Clone, Copy)]
pub struct PopulationFactory<'a> {
    family: &'a str,
    ranges: &'a [HyperparameterRange],
}

impl<'a> PopulationFactory<'a> {
    /// # Errors
    ///
    /// Returns `SearchError::UnknownModelFamily` if `family` is not in `schema`.
    pub fn new(schema: &'a HyperparameterSchema, family: &'a str) -> Result<Self> {
        let ranges = schema.ranges_for(family)?;
        Ok(Self { family, ranges })
    }

    pub fn family(&self) -> &str {
        self.family
    }

    pub fn ranges(&self) -> &'a [HyperparameterRange] {
        self.ranges
    }

    pub fn random_chromosome(&self, rng: &mut RandomNumberGenerator) -> Chromosome {
        Chromosome::random(self.ranges, rng)
    }

    /// Draws `size` independent chromosomes. Duplicates are allowed.
    pub fn create_population(&self, size: usize, rng: &mut RandomNumberGenerator) -> Population {
        (0..size).map(|_| self.random_chromosome(rng)).collect()
    }
}
