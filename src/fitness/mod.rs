//! # Fitness
//!
//! The fitness adapter sits between the search and the external model
//! trainers. It maps a chromosome onto trainer parameters, fits and scores a
//! model, and contains every failure: an incompatible task kind, a trainer
//! error, a non-finite score or a panic inside the trainer all become an
//! [`Evaluation::Failed`] for that one individual and never abort a run.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hyperga::chromosome::{Chromosome, Gene};
//! use hyperga::dataset::{DataSplit, TaskKind};
//! use hyperga::fitness::{FitnessEvaluator, ModelHandle, TrainError, Trainer, TrainerParams};
//! use hyperga::schema::ParamValue;
//!
//! struct Constant;
//!
//! impl Trainer for Constant {
//!     fn fit(&self, params: &TrainerParams, _: &DataSplit, _: TaskKind)
//!         -> Result<ModelHandle, TrainError> {
//!         Ok(ModelHandle::new(params.real("x").unwrap_or(0.0)))
//!     }
//!
//!     fn score(&self, model: &ModelHandle, _: &DataSplit, _: TaskKind)
//!         -> Result<f64, TrainError> {
//!         model.downcast_ref::<f64>().copied().ok_or(TrainError::Failed("bad model".into()))
//!     }
//! }
//!
//! let split = DataSplit::new(vec![vec![0.0]], vec![1.0]).unwrap();
//! let evaluator = FitnessEvaluator::new("toy", Arc::new(Constant), &split, &split);
//! let chromosome = Chromosome::from_genes(vec![Gene::new("x", ParamValue::Real(0.25))]);
//!
//! let result = evaluator.evaluate(&chromosome, 0);
//! assert_eq!(result.evaluation.score(), Some(0.25));
//! ```

pub mod params;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::caching::EvaluationCache;
use crate::chromosome::Chromosome;
use crate::dataset::{DataSplit, TaskKind};
use crate::error::{OptionExt, Result, SearchError};

pub use params::{ParamSetting, TrainerParams};

/// Raw score recorded for an evaluation that produced no usable score.
///
/// Only raw score sequences carry it; ranking goes through [`Evaluation`].
pub const SENTINEL_SCORE: f64 = f64::NEG_INFINITY;

/// Opaque handle to a trained model. The search only holds on to it.
#[derive(Clone)]
pub struct ModelHandle(Arc<dyn Any + Send + Sync>);

impl ModelHandle {
    pub fn new<T: Any + Send + Sync>(model: T) -> Self {
        Self(Arc::new(model))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelHandle(..)")
    }
}

/// Errors a trainer reports back to the adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    /// The model family cannot produce predictions for this kind of target.
    #[error("model family '{family}' cannot handle a {task} target")]
    IncompatibleTask { family: String, task: TaskKind },

    /// The mapped parameters describe a model that cannot be built.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Fitting or scoring failed.
    #[error("training failed: {0}")]
    Failed(String),
}

/// Capability interface of an external model trainer for one model family.
pub trait Trainer: Send + Sync {
    /// Whether the family can produce predictions for `task`.
    ///
    /// Unsupported tasks are reported as incompatible without calling `fit`.
    fn supports(&self, _task: TaskKind) -> bool {
        true
    }

    fn fit(
        &self,
        params: &TrainerParams,
        training: &DataSplit,
        task: TaskKind,
    ) -> std::result::Result<ModelHandle, TrainError>;

    fn score(
        &self,
        model: &ModelHandle,
        validation: &DataSplit,
        task: TaskKind,
    ) -> std::result::Result<f64, TrainError>;
}

/// Explicit model-family to trainer mapping.
#[derive(Clone, Default)]
pub struct TrainerRegistry {
    trainers: HashMap<String, Arc<dyn Trainer>>,
}

impl TrainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `trainer` for `family`, replacing any previous one.
    pub fn with_trainer(mut self, family: impl Into<String>, trainer: Arc<dyn Trainer>) -> Self {
        self.register(family, trainer);
        self
    }

    pub fn register(&mut self, family: impl Into<String>, trainer: Arc<dyn Trainer>) {
        self.trainers.insert(family.into(), trainer);
    }

    /// # Errors
    ///
    /// Returns `SearchError::MissingTrainer` if nothing is registered for `family`.
    pub fn get(&self, family: &str) -> Result<Arc<dyn Trainer>> {
        self.trainers
            .get(family)
            .cloned()
            .ok_or_else_search(|| SearchError::MissingTrainer(family.to_string()))
    }

    pub fn contains(&self, family: &str) -> bool {
        self.trainers.contains_key(family)
    }
}

impl fmt::Debug for TrainerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut families: Vec<&String> = self.trainers.keys().collect();
        families.sort();
        f.debug_struct("TrainerRegistry")
            .field("families", &families)
            .finish()
    }
}

/// Why an evaluation produced no score.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    IncompatibleTask(TaskKind),
    InvalidParameters(String),
    Trainer(String),
    Panicked(String),
    NonFiniteScore(f64),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::IncompatibleTask(task) => write!(f, "incompatible with {} target", task),
            FailureReason::InvalidParameters(msg) => write!(f, "invalid parameters: {}", msg),
            FailureReason::Trainer(msg) => write!(f, "trainer error: {}", msg),
            FailureReason::Panicked(msg) => write!(f, "trainer panicked: {}", msg),
            FailureReason::NonFiniteScore(score) => write!(f, "non-finite score {}", score),
        }
    }
}

impl From<TrainError> for FailureReason {
    fn from(err: TrainError) -> Self {
        match err {
            TrainError::IncompatibleTask { task, .. } => FailureReason::IncompatibleTask(task),
            TrainError::InvalidParameters(msg) => FailureReason::InvalidParameters(msg),
            TrainError::Failed(msg) => FailureReason::Trainer(msg),
        }
    }
}

/// Outcome of evaluating one chromosome.
#[derive(Debug, Clone)]
pub enum Evaluation {
    Scored { score: f64, model: ModelHandle },
    Failed(FailureReason),
}

impl Evaluation {
    pub fn score(&self) -> Option<f64> {
        match self {
            Evaluation::Scored { score, .. } => Some(*score),
            Evaluation::Failed(_) => None,
        }
    }

    /// The score, or [`SENTINEL_SCORE`] for a failure.
    pub fn raw_score(&self) -> f64 {
        self.score().unwrap_or(SENTINEL_SCORE)
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        match self {
            Evaluation::Scored { model, .. } => Some(model),
            Evaluation::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Evaluation::Failed(_))
    }

    /// Strict ranking: a failure never beats anything, and any score beats a failure.
    pub fn beats(&self, other: &Evaluation) -> bool {
        match (self.score(), other.score()) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// A chromosome together with its evaluation.
#[derive(Debug, Clone)]
pub struct FitnessResult {
    pub chromosome: Chromosome,
    pub evaluation: Evaluation,
}

/// Evaluates chromosomes of one model family against a fixed split.
#[derive(Clone)]
pub struct FitnessEvaluator<'a> {
    family: &'a str,
    trainer: Arc<dyn Trainer>,
    training: &'a DataSplit,
    validation: &'a DataSplit,
    task: TaskKind,
    cache: Option<&'a EvaluationCache>,
}

impl<'a> FitnessEvaluator<'a> {
    /// The task kind is inferred once from the training targets.
    pub fn new(
        family: &'a str,
        trainer: Arc<dyn Trainer>,
        training: &'a DataSplit,
        validation: &'a DataSplit,
    ) -> Self {
        Self {
            family,
            trainer,
            training,
            validation,
            task: training.task_kind(),
            cache: None,
        }
    }

    /// Reuses evaluations of identical chromosomes through `cache`.
    pub fn with_cache(mut self, cache: &'a EvaluationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// Evaluates `chromosome`; the zero-based `generation` is used for log context only.
    pub fn evaluate(&self, chromosome: &Chromosome, generation: usize) -> FitnessResult {
        if let Some(evaluation) = self.cache.and_then(|cache| cache.get(chromosome)) {
            return FitnessResult {
                chromosome: chromosome.clone(),
                evaluation,
            };
        }

        let evaluation = self.evaluate_uncached(chromosome);
        if let Evaluation::Failed(reason) = &evaluation {
            match reason {
                FailureReason::IncompatibleTask(_) => debug!(
                    generation,
                    family = self.family,
                    %chromosome,
                    %reason,
                    "Evaluation skipped"
                ),
                _ => warn!(
                    generation,
                    family = self.family,
                    %chromosome,
                    %reason,
                    "Fitness evaluation failed"
                ),
            }
        }

        if let Some(cache) = self.cache {
            cache.insert(chromosome, evaluation.clone());
        }
        FitnessResult {
            chromosome: chromosome.clone(),
            evaluation,
        }
    }

    fn evaluate_uncached(&self, chromosome: &Chromosome) -> Evaluation {
        if !self.trainer.supports(self.task) {
            return Evaluation::Failed(FailureReason::IncompatibleTask(self.task));
        }

        let params = TrainerParams::from_chromosome(self.family, chromosome);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let model = self.trainer.fit(&params, self.training, self.task)?;
            let score = self.trainer.score(&model, self.validation, self.task)?;
            Ok::<_, TrainError>((score, model))
        }));

        match outcome {
            Ok(Ok((score, model))) if score.is_finite() => Evaluation::Scored { score, model },
            Ok(Ok((score, _))) => Evaluation::Failed(FailureReason::NonFiniteScore(score)),
            Ok(Err(err)) => Evaluation::Failed(err.into()),
            Err(payload) => Evaluation::Failed(FailureReason::Panicked(panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
