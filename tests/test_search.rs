use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hyperga::{
    chromosome::Chromosome,
    dataset::{DataSplit, Dataset, TaskKind},
    error::SearchError,
    evolution::{GeneticSearch, LogLevel, SearchOptions},
    fitness::{ModelHandle, TrainError, Trainer, TrainerParams, TrainerRegistry, SENTINEL_SCORE},
    metrics,
    report::{RunReport, NO_SOLUTION_MESSAGE},
    rng::RandomNumberGenerator,
    schema::{families, HyperparameterRange, HyperparameterSchema},
    selection::TournamentSelection,
    strategy::{BreedStrategy, SinglePointBreeding},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Scores a model by the value of one of its parameters.
struct GeneTrainer {
    gene: &'static str,
    fits: AtomicUsize,
}

impl GeneTrainer {
    fn new(gene: &'static str) -> Self {
        Self {
            gene,
            fits: AtomicUsize::new(0),
        }
    }
}

impl Trainer for GeneTrainer {
    fn fit(
        &self,
        params: &TrainerParams,
        _training: &DataSplit,
        _task: TaskKind,
    ) -> Result<ModelHandle, TrainError> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        let value = params
            .real(self.gene)
            .ok_or_else(|| TrainError::InvalidParameters(format!("missing {}", self.gene)))?;
        Ok(ModelHandle::new(value))
    }

    fn score(
        &self,
        model: &ModelHandle,
        _validation: &DataSplit,
        _task: TaskKind,
    ) -> Result<f64, TrainError> {
        model
            .downcast_ref::<f64>()
            .copied()
            .ok_or_else(|| TrainError::Failed("unexpected model".into()))
    }
}

/// A classifier-only family used against a regression target.
struct ClassifierOnly;

impl Trainer for ClassifierOnly {
    fn supports(&self, task: TaskKind) -> bool {
        task == TaskKind::Classification
    }

    fn fit(
        &self,
        _params: &TrainerParams,
        _training: &DataSplit,
        task: TaskKind,
    ) -> Result<ModelHandle, TrainError> {
        Err(TrainError::IncompatibleTask {
            family: families::SVM.to_string(),
            task,
        })
    }

    fn score(
        &self,
        _model: &ModelHandle,
        _validation: &DataSplit,
        _task: TaskKind,
    ) -> Result<f64, TrainError> {
        Ok(1.0)
    }
}

/// Crashes on odd values of `x`, scores `x` otherwise.
struct OddCrashTrainer;

impl Trainer for OddCrashTrainer {
    fn fit(
        &self,
        params: &TrainerParams,
        _training: &DataSplit,
        _task: TaskKind,
    ) -> Result<ModelHandle, TrainError> {
        let x = params.integer("x").unwrap_or(0);
        if x % 2 == 1 {
            panic!("odd configuration");
        }
        Ok(ModelHandle::new(x as f64))
    }

    fn score(
        &self,
        model: &ModelHandle,
        _validation: &DataSplit,
        _task: TaskKind,
    ) -> Result<f64, TrainError> {
        Ok(*model.downcast_ref::<f64>().unwrap())
    }
}

/// Predicts class 1 when the first feature exceeds `threshold`.
struct StumpTrainer;

impl Trainer for StumpTrainer {
    fn supports(&self, task: TaskKind) -> bool {
        task == TaskKind::Classification
    }

    fn fit(
        &self,
        params: &TrainerParams,
        _training: &DataSplit,
        _task: TaskKind,
    ) -> Result<ModelHandle, TrainError> {
        let threshold = params
            .real("threshold")
            .ok_or_else(|| TrainError::InvalidParameters("missing threshold".into()))?;
        Ok(ModelHandle::new(threshold))
    }

    fn score(
        &self,
        model: &ModelHandle,
        validation: &DataSplit,
        task: TaskKind,
    ) -> Result<f64, TrainError> {
        let threshold = *model.downcast_ref::<f64>().unwrap();
        let predictions: Vec<f64> = validation
            .features()
            .iter()
            .map(|row| if row[0] > threshold { 1.0 } else { 0.0 })
            .collect();
        metrics::score_for(task, validation.targets(), &predictions)
            .map_err(|e| TrainError::Failed(e.to_string()))
    }
}

fn toy_schema() -> HyperparameterSchema {
    HyperparameterSchema::builder()
        .family("toy", vec![HyperparameterRange::integer("x", 0, 10).unwrap()])
        .family(
            "pair",
            vec![
                HyperparameterRange::integer("x", 0, 10).unwrap(),
                HyperparameterRange::real("y", 0.0, 1.0).unwrap(),
            ],
        )
        .family(
            "stump",
            vec![
                HyperparameterRange::real("threshold", 0.0, 10.0).unwrap(),
                HyperparameterRange::integer("unused", 0, 3).unwrap(),
            ],
        )
        .build()
        .unwrap()
}

fn regression_split() -> DataSplit {
    DataSplit::new(vec![vec![0.0], vec![1.0], vec![2.0]], vec![0.1, 0.7, 1.9]).unwrap()
}

fn search(trainers: TrainerRegistry, options: SearchOptions) -> GeneticSearch {
    GeneticSearch::new(toy_schema(), trainers, options).unwrap()
}

#[test]
fn test_single_gene_schema_runs() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));

    let result = search(trainers, SearchOptions::default())
        .run(&split, &split, 1, 4, "toy")
        .unwrap();

    assert_eq!(result.generation_scores.len(), 1);
    assert_eq!(result.generation_records[0].evaluated, 4);
    assert!(result.found_solution());
}

#[test]
fn test_all_failing_trainer() {
    init_tracing();
    let split = regression_split();
    let standard = HyperparameterSchema::standard();
    let schema = HyperparameterSchema::builder()
        .family(families::SVM, standard.ranges_for(families::SVM).unwrap().to_vec())
        .build()
        .unwrap();
    let trainers = TrainerRegistry::new().with_trainer(families::SVM, Arc::new(ClassifierOnly));

    let result = GeneticSearch::new(schema, trainers, SearchOptions::default())
        .unwrap()
        .run(&split, &split, 3, 6, families::SVM)
        .unwrap();

    assert!(result.best_chromosome.is_none());
    assert!(result.best_model.is_none());
    assert_eq!(result.best_score, SENTINEL_SCORE);
    assert_eq!(result.generation_scores, vec![SENTINEL_SCORE; 3]);
    assert!(result.generation_records.iter().all(|r| r.all_failed()));

    let report = RunReport::from_result(&result);
    assert_eq!(report.generation_scores, vec![0.0, 0.0, 0.0]);
    assert_eq!(report.best_score, 0.0);
    assert_eq!(report.best_params, None);
    assert_eq!(report.message, NO_SOLUTION_MESSAGE);
    assert_eq!(report.task_type, TaskKind::Regression);
}

#[test]
fn test_best_score_is_max_of_all_draws() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));
    let options = SearchOptions::builder().top_k(4).seed(2024).build();

    let result = search(trainers, options).run(&split, &split, 5, 4, "toy").unwrap();

    let max_seen = result
        .generation_records
        .iter()
        .flat_map(|r| r.top_candidates.iter())
        .map(|c| c.score)
        .fold(f64::NEG_INFINITY, f64::max);

    assert_eq!(result.best_score, max_seen);
    let best_x = result.best_chromosome.as_ref().unwrap().get("x").unwrap();
    assert_eq!(best_x.as_f64(), result.best_score);
    assert_eq!(
        *result.best_model.as_ref().unwrap().downcast_ref::<f64>().unwrap(),
        result.best_score
    );
}

#[test]
fn test_best_ever_is_monotonic() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("pair", Arc::new(GeneTrainer::new("y")));
    let options = SearchOptions::builder().mutation_rate(0.5).seed(9).build();

    let result = search(trainers, options).run(&split, &split, 12, 6, "pair").unwrap();

    let mut best_so_far = f64::NEG_INFINITY;
    for &score in &result.generation_scores {
        best_so_far = best_so_far.max(score);
        assert!(result.best_score >= score);
    }
    assert_eq!(result.best_score, best_so_far);
}

#[test]
fn test_population_size_is_invariant() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("pair", Arc::new(GeneTrainer::new("y")));

    for population_size in [1, 2, 5, 8] {
        let result = search(trainers.clone(), SearchOptions::default())
            .run(&split, &split, 4, population_size, "pair")
            .unwrap();

        assert_eq!(result.generation_records.len(), 4);
        for record in &result.generation_records {
            assert_eq!(record.evaluated, population_size);
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("pair", Arc::new(GeneTrainer::new("y")));
    let options = SearchOptions::builder().seed(77).build();
    let engine = search(trainers, options);

    let first = engine.run(&split, &split, 6, 7, "pair").unwrap();
    let second = engine.run(&split, &split, 6, 7, "pair").unwrap();

    assert_eq!(first.generation_scores, second.generation_scores);
    assert_eq!(first.best_chromosome, second.best_chromosome);
    assert_eq!(first.generation_records, second.generation_records);
}

#[test]
fn test_parallel_evaluation_matches_sequential() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("pair", Arc::new(GeneTrainer::new("y")));

    let sequential = SearchOptions::builder()
        .seed(5)
        .parallel_threshold(usize::MAX)
        .build();
    let parallel = SearchOptions::builder()
        .seed(5)
        .parallel_threshold(1)
        .log_level(LogLevel::Verbose)
        .build();

    let a = search(trainers.clone(), sequential)
        .run(&split, &split, 5, 16, "pair")
        .unwrap();
    let b = search(trainers, parallel)
        .run(&split, &split, 5, 16, "pair")
        .unwrap();

    assert_eq!(a.generation_records, b.generation_records);
    assert_eq!(a.best_chromosome, b.best_chromosome);
}

#[test]
fn test_cache_avoids_refitting() {
    init_tracing();
    let split = regression_split();
    let uncached_trainer = Arc::new(GeneTrainer::new("x"));
    let cached_trainer = Arc::new(GeneTrainer::new("x"));

    let uncached = search(
        TrainerRegistry::new().with_trainer("toy", uncached_trainer.clone()),
        SearchOptions::builder().seed(3).build(),
    )
    .run(&split, &split, 6, 10, "toy")
    .unwrap();
    let cached = search(
        TrainerRegistry::new().with_trainer("toy", cached_trainer.clone()),
        SearchOptions::builder()
            .seed(3)
            .cache_evaluations(true)
            .parallel_threshold(usize::MAX)
            .build(),
    )
    .run(&split, &split, 6, 10, "toy")
    .unwrap();

    assert_eq!(uncached.generation_scores, cached.generation_scores);
    assert_eq!(uncached_trainer.fits.load(Ordering::SeqCst), 60);
    // Only 11 distinct values of x exist
    assert!(cached_trainer.fits.load(Ordering::SeqCst) <= 11);
}

#[test]
fn test_crashing_configurations_never_win() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(OddCrashTrainer));
    let options = SearchOptions::builder().seed(12).log_level(LogLevel::None).build();

    let result = search(trainers, options).run(&split, &split, 4, 8, "toy").unwrap();

    let best = result.best_chromosome.expect("even values are drawn");
    assert_eq!(best.get("x").unwrap().as_i64() % 2, 0);
    for record in &result.generation_records {
        assert!(record
            .top_candidates
            .iter()
            .all(|c| c.chromosome.get("x").unwrap().as_i64() % 2 == 0));
    }
}

#[test]
fn test_end_to_end_classification() {
    init_tracing();
    let rows = 60;
    let features = (0..rows).map(|i| vec![i as f64 / 6.0]).collect();
    let labels: Vec<&str> = (0..rows)
        .map(|i| if i < 30 { "low" } else { "high" })
        .collect();
    let dataset = Dataset::from_labels(vec!["value".into()], features, &labels).unwrap();
    let (training, validation) = dataset.train_validation_split(0.2, 42).unwrap();

    let trainers = TrainerRegistry::new().with_trainer("stump", Arc::new(StumpTrainer));
    let options = SearchOptions::builder().seed(1).build();

    let result = search(trainers, options)
        .run(&training, &validation, 8, 10, "stump")
        .unwrap();

    assert_eq!(result.task, TaskKind::Classification);
    assert!(result.best_score > 0.8);
    assert!(result.best_score <= 1.0);

    let report = RunReport::from_result(&result);
    assert!(report.found_solution());
    assert_eq!(report.model_type, "stump");
}

#[test]
fn test_configuration_errors() {
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));
    let engine = search(trainers, SearchOptions::default());

    assert!(matches!(
        engine.run(&split, &split, 3, 4, "unknown"),
        Err(SearchError::UnknownModelFamily(_))
    ));
    assert!(matches!(
        engine.run(&split, &split, 3, 4, "pair"),
        Err(SearchError::MissingTrainer(_))
    ));
    assert!(matches!(
        engine.run(&split, &split, 0, 4, "toy"),
        Err(SearchError::Configuration(_))
    ));
    assert!(matches!(
        engine.run(&split, &split, 3, 0, "toy"),
        Err(SearchError::Configuration(_))
    ));

    let bad_options = SearchOptions::builder().mutation_rate(2.0).build();
    let result = GeneticSearch::new(toy_schema(), TrainerRegistry::new(), bad_options);
    assert!(result.unwrap_err().is_configuration());
}

/// Always fails to fit.
struct BrokenTrainer;

impl Trainer for BrokenTrainer {
    fn fit(
        &self,
        _params: &TrainerParams,
        _training: &DataSplit,
        _task: TaskKind,
    ) -> Result<ModelHandle, TrainError> {
        Err(TrainError::Failed("solver diverged".into()))
    }

    fn score(
        &self,
        _model: &ModelHandle,
        _validation: &DataSplit,
        _task: TaskKind,
    ) -> Result<f64, TrainError> {
        Ok(0.0)
    }
}

/// Breeds one child fewer than asked.
#[derive(Debug, Clone)]
struct ShrinkingBreeding;

impl BreedStrategy for ShrinkingBreeding {
    fn breed(
        &self,
        parents: &[Chromosome],
        _ranges: &[HyperparameterRange],
        population_size: usize,
        _rng: &mut RandomNumberGenerator,
    ) -> hyperga::Result<Vec<Chromosome>> {
        Ok(parents
            .iter()
            .take(population_size.saturating_sub(1))
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn generations_logged(output: &str, message: &str) -> BTreeSet<usize> {
    output
        .lines()
        .filter(|line| line.contains(message))
        .filter_map(|line| {
            let start = line.find("generation=")? + "generation=".len();
            let digits: String = line[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
        .collect()
}

#[test]
fn test_unvalidated_options_are_rejected_by_run() {
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));
    let options = SearchOptions::builder().top_k(0).build();
    let engine = GeneticSearch::with_strategies(
        toy_schema(),
        trainers,
        options,
        TournamentSelection::default(),
        SinglePointBreeding::default(),
    );

    let result = engine.run(&split, &split, 2, 4, "toy");
    assert!(matches!(result, Err(SearchError::Configuration(_))));
}

#[test]
fn test_record_best_matches_generation_scores() {
    init_tracing();
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));
    let options = SearchOptions::builder().top_k(1).seed(31).build();

    let result = search(trainers, options).run(&split, &split, 4, 6, "toy").unwrap();

    let record_best: Vec<f64> = result
        .generation_records
        .iter()
        .map(|r| r.best_score)
        .collect();
    assert_eq!(record_best, result.generation_scores);
}

#[test]
fn test_breeding_that_shrinks_population_fails() {
    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(GeneTrainer::new("x")));
    let engine = GeneticSearch::with_strategies(
        toy_schema(),
        trainers,
        SearchOptions::default(),
        TournamentSelection::default(),
        ShrinkingBreeding,
    );

    // A single generation never breeds
    assert!(engine.run(&split, &split, 1, 4, "toy").is_ok());
    assert!(matches!(
        engine.run(&split, &split, 2, 4, "toy"),
        Err(SearchError::Configuration(_))
    ));
}

#[test]
fn test_failure_logs_share_generation_index_with_summaries() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let split = regression_split();
    let trainers = TrainerRegistry::new().with_trainer("toy", Arc::new(BrokenTrainer));
    let options = SearchOptions::builder()
        .parallel_threshold(usize::MAX)
        .build();

    tracing::subscriber::with_default(subscriber, || {
        search(trainers, options)
            .run(&split, &split, 3, 4, "toy")
            .unwrap();
    });

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let failures = generations_logged(&output, "Fitness evaluation failed");
    let summaries = generations_logged(&output, "Generation complete");

    assert_eq!(summaries, BTreeSet::from([0, 1, 2]));
    assert_eq!(failures, summaries);
}
