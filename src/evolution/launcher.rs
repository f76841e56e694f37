use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use super::{
    options::{LogLevel, SearchOptions},
    record::{GenerationRecord, RunResult},
};
use crate::{
    caching::EvaluationCache,
    chromosome::Chromosome,
    dataset::DataSplit,
    error::{Result, SearchError},
    fitness::{
        Evaluation, FitnessEvaluator, FitnessResult, ModelHandle, TrainerRegistry, SENTINEL_SCORE,
    },
    population::{Population, PopulationFactory},
    rng::RandomNumberGenerator,
    schema::HyperparameterSchema,
    selection::{SelectionStrategy, TournamentSelection},
    strategy::{BreedStrategy, SinglePointBreeding},
};

/// Runs the generational hyperparameter search.
///
/// Owns the schema, the trainer registry and the operators; every call to
/// [`run`](Self::run) builds its own population and random number generator, so
/// one `GeneticSearch` can serve independent runs.
#[derive(Debug, Clone)]
pub struct GeneticSearch<S = TournamentSelection, B = SinglePointBreeding>
where
    S: SelectionStrategy + Clone,
    B: BreedStrategy,
{
    schema: HyperparameterSchema,
    trainers: TrainerRegistry,
    options: SearchOptions,
    selection: S,
    breeding: B,
}

impl GeneticSearch {
    /// Creates a search with tournament selection and single-point breeding
    /// configured from `options`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` if `options` are invalid.
    pub fn new(
        schema: HyperparameterSchema,
        trainers: TrainerRegistry,
        options: SearchOptions,
    ) -> Result<Self> {
        options.validate()?;
        let selection = TournamentSelection::new(options.get_tournament_size())?;
        let breeding = SinglePointBreeding::new(options.get_mutation_rate())?;
        Ok(Self::with_strategies(
            schema, trainers, options, selection, breeding,
        ))
    }
}

impl<S, B> GeneticSearch<S, B>
where
    S: SelectionStrategy + Clone,
    B: BreedStrategy,
{
    pub fn with_strategies(
        schema: HyperparameterSchema,
        trainers: TrainerRegistry,
        options: SearchOptions,
        selection: S,
        breeding: B,
    ) -> Self {
        Self {
            schema,
            trainers,
            options,
            selection,
            breeding,
        }
    }

    pub fn schema(&self) -> &HyperparameterSchema {
        &self.schema
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Searches `family`'s hyperparameters for `generations` generations of
    /// `population_size` chromosomes, seeded from the options.
    ///
    /// # Errors
    ///
    /// Only configuration problems are errors: invalid options, an unknown family,
    /// a family without a trainer, a zero generation budget or population size, or
    /// operators that do not keep the population size. Failed evaluations are part
    /// of the returned [`RunResult`].
    pub fn run(
        &self,
        training: &DataSplit,
        validation: &DataSplit,
        generations: usize,
        population_size: usize,
        family: &str,
    ) -> Result<RunResult> {
        let mut rng = RandomNumberGenerator::from_seed(self.options.get_seed());
        self.run_with_rng(
            training,
            validation,
            generations,
            population_size,
            family,
            &mut rng,
        )
    }

    /// Like [`run`](Self::run), drawing from a caller-supplied generator.
    pub fn run_with_rng(
        &self,
        training: &DataSplit,
        validation: &DataSplit,
        generations: usize,
        population_size: usize,
        family: &str,
        rng: &mut RandomNumberGenerator,
    ) -> Result<RunResult> {
        self.options.validate()?;
        let factory = PopulationFactory::new(&self.schema, family)?;
        let trainer = self.trainers.get(family)?;
        if generations < 1 {
            return Err(SearchError::Configuration(
                "Number of generations must be at least 1".to_string(),
            ));
        }
        if population_size < 1 {
            return Err(SearchError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }

        let cache = EvaluationCache::new();
        let mut evaluator = FitnessEvaluator::new(family, trainer, training, validation);
        if self.options.get_cache_evaluations() {
            evaluator = evaluator.with_cache(&cache);
        }

        let _span = info_span!("search", family, generations, population_size).entered();
        info!(task = %evaluator.task(), "Starting hyperparameter search");

        let mut population = factory.create_population(population_size, rng);
        let mut best: Option<(Chromosome, f64, ModelHandle)> = None;
        let mut generation_scores = Vec::with_capacity(generations);
        let mut generation_records = Vec::with_capacity(generations);

        for generation in 0..generations {
            let results = self.evaluate_population(&evaluator, &population, generation);

            // First occurrence of the highest score wins
            let mut leader = &results[0];
            for candidate in &results[1..] {
                if candidate.evaluation.beats(&leader.evaluation) {
                    leader = candidate;
                }
            }
            if let Evaluation::Scored { score, model } = &leader.evaluation {
                if best.as_ref().map_or(true, |(_, best_score, _)| score > best_score) {
                    best = Some((leader.chromosome.clone(), *score, model.clone()));
                }
            }

            let record =
                GenerationRecord::from_results(generation, &results, self.options.get_top_k());
            self.log_generation(&record, &leader.chromosome, &results);
            generation_scores.push(leader.evaluation.raw_score());
            generation_records.push(record);

            if generation + 1 < generations {
                let fitness: Vec<Evaluation> =
                    results.into_iter().map(|r| r.evaluation).collect();
                let parents = self
                    .selection
                    .select(&population, &fitness, population_size, rng)?;
                population = self
                    .breeding
                    .breed(&parents, factory.ranges(), population_size, rng)?;
                if population.len() != population_size {
                    return Err(SearchError::Configuration(format!(
                        "Breeding produced {} chromosomes, expected {}",
                        population.len(),
                        population_size
                    )));
                }
            }
        }

        let (best_chromosome, best_score, best_model) = match best {
            Some((chromosome, score, model)) => {
                info!(best_score = score, best = %chromosome, "Search finished");
                (Some(chromosome), score, Some(model))
            }
            None => {
                warn!("No valid solution found: every evaluation failed");
                (None, SENTINEL_SCORE, None)
            }
        };

        Ok(RunResult {
            family: family.to_string(),
            task: evaluator.task(),
            best_chromosome,
            best_score,
            best_model,
            generation_scores,
            generation_records,
        })
    }

    /// Evaluates every chromosome, in parallel for large populations.
    ///
    /// Results are returned in population order either way.
    fn evaluate_population(
        &self,
        evaluator: &FitnessEvaluator<'_>,
        population: &Population,
        generation: usize,
    ) -> Vec<FitnessResult> {
        if population.len() >= self.options.get_parallel_threshold() {
            population
                .par_iter()
                .map(|chromosome| evaluator.evaluate(chromosome, generation))
                .collect()
        } else {
            population
                .iter()
                .map(|chromosome| evaluator.evaluate(chromosome, generation))
                .collect()
        }
    }

    fn log_generation(
        &self,
        record: &GenerationRecord,
        leader: &Chromosome,
        results: &[FitnessResult],
    ) {
        match self.options.get_log_level() {
            LogLevel::None => {}
            level => {
                info!(
                    generation = record.generation,
                    best_score = record.best_score,
                    average = ?record.average_score,
                    failed = record.failed,
                    params = %leader,
                    "Generation complete"
                );
                if level == LogLevel::Verbose {
                    for result in results {
                        debug!(
                            generation = record.generation,
                            score = result.evaluation.raw_score(),
                            chromosome = %result.chromosome,
                            "Candidate"
                        );
                    }
                }
            }
        }
    }
}
