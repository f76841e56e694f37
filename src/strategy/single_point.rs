//! # SinglePointBreeding
//!
//! Pairs consecutive parents, cuts each pair at one random point and swaps the
//! tails, then resamples every gene of each child with probability
//! `mutation_rate`.

use super::BreedStrategy;
use crate::{
    chromosome::{Chromosome, Gene},
    error::{Result, SearchError},
    rng::RandomNumberGenerator,
    schema::HyperparameterRange,
};

/// Default probability of resampling a gene.
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Single-point crossover followed by per-gene resampling mutation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SinglePointBreeding {
    mutation_rate: f64,
}

impl SinglePointBreeding {
    /// # Errors
    ///
    /// Returns an error if `mutation_rate` is outside `[0, 1]`.
    pub fn new(mutation_rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(SearchError::Configuration(format!(
                "Mutation rate must be in [0, 1], got {}",
                mutation_rate
            )));
        }
        Ok(Self { mutation_rate })
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Crosses `first` and `second` at a cut point drawn from `1..len`.
    ///
    /// Chromosomes with fewer than two genes cannot be cut; copies of the
    /// parents are returned and no random draw is made.
    pub fn crossover(
        &self,
        first: &Chromosome,
        second: &Chromosome,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(Chromosome, Chromosome)> {
        if !first.names().eq(second.names()) {
            return Err(SearchError::Configuration(format!(
                "Cannot cross {} with {}: gene order differs",
                first, second
            )));
        }
        let len = first.len();
        if len < 2 {
            return Ok((first.clone(), second.clone()));
        }
        let point = rng.gen_integer(1, len as i64 - 1) as usize;
        Ok(Self::crossover_at(first, second, point))
    }

    /// Child A takes `first`'s genes before `point` and `second`'s from `point`
    /// on; child B is the complement.
    pub fn crossover_at(
        first: &Chromosome,
        second: &Chromosome,
        point: usize,
    ) -> (Chromosome, Chromosome) {
        (first.splice(second, point), second.splice(first, point))
    }

    /// Returns a copy of `chromosome` where each gene was independently redrawn
    /// from its range with probability `mutation_rate`.
    pub fn mutate(
        &self,
        chromosome: &Chromosome,
        ranges: &[HyperparameterRange],
        rng: &mut RandomNumberGenerator,
    ) -> Chromosome {
        let genes = chromosome
            .genes()
            .iter()
            .zip(ranges)
            .map(|(gene, range)| {
                if rng.chance(self.mutation_rate) {
                    Gene::new(gene.name.clone(), range.sample(rng))
                } else {
                    gene.clone()
                }
            })
            .collect();
        Chromosome::from_genes(genes)
    }
}

impl Default for SinglePointBreeding {
    fn default() -> Self {
        Self {
            mutation_rate: DEFAULT_MUTATION_RATE,
        }
    }
}

impl BreedStrategy for SinglePointBreeding {
    /// Parent `2i` is paired with parent `2i + 1`; an odd last parent is paired
    /// with itself. Each pair yields two mutated children and the result is
    /// truncated to `population_size`.
    fn breed(
        &self,
        parents: &[Chromosome],
        ranges: &[HyperparameterRange],
        population_size: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>> {
        if parents.is_empty() {
            return Err(SearchError::EmptyPopulation);
        }

        let last = parents.len() - 1;
        let mut children = Vec::with_capacity(parents.len() + 1);
        for i in (0..parents.len()).step_by(2) {
            let first = &parents[i];
            let second = &parents[(i + 1).min(last)];
            let (child_a, child_b) = self.crossover(first, second, rng)?;
            children.push(self.mutate(&child_a, ranges, rng));
            children.push(self.mutate(&child_b, ranges, rng));
        }

        children.truncate(population_size);
        Ok(children)
    }
}
