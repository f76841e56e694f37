//! Per-generation statistics and the result of a whole run.

use crate::chromosome::Chromosome;
use crate::dataset::TaskKind;
use crate::fitness::{FitnessResult, ModelHandle, SENTINEL_SCORE};

/// A chromosome and the score it achieved.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub chromosome: Chromosome,
    pub score: f64,
}

/// Mean, median and population standard deviation of a set of scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreSummary {
    /// Returns `None` for an empty slice.
    pub fn new(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Statistics of one evaluated generation.
///
/// Central-tendency fields cover successful evaluations only and are `None`
/// when every evaluation of the generation failed; `best_score` is then
/// [`SENTINEL_SCORE`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
    /// Zero-based generation index.
    pub generation: usize,
    pub best_score: f64,
    pub average_score: Option<f64>,
    pub median_score: Option<f64>,
    pub std_dev: Option<f64>,
    pub evaluated: usize,
    pub failed: usize,
    /// Best successful candidates, score descending, ties in population order.
    pub top_candidates: Vec<ScoredCandidate>,
}

impl GenerationRecord {
    pub fn from_results(generation: usize, results: &[FitnessResult], top_k: usize) -> Self {
        let mut scored: Vec<(&Chromosome, f64)> = results
            .iter()
            .filter_map(|r| r.evaluation.score().map(|s| (&r.chromosome, s)))
            .collect();
        let scores: Vec<f64> = scored.iter().map(|(_, s)| *s).collect();
        let summary = ScoreSummary::new(&scores);
        let best_score = scores.iter().copied().fold(SENTINEL_SCORE, f64::max);

        // Stable, so equal scores keep population order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        let top_candidates = scored
            .into_iter()
            .take(top_k)
            .map(|(chromosome, score)| ScoredCandidate {
                chromosome: chromosome.clone(),
                score,
            })
            .collect::<Vec<_>>();

        Self {
            generation,
            best_score,
            average_score: summary.map(|s| s.mean),
            median_score: summary.map(|s| s.median),
            std_dev: summary.map(|s| s.std_dev),
            evaluated: results.len(),
            failed: results.len() - scores.len(),
            top_candidates,
        }
    }

    pub fn all_failed(&self) -> bool {
        self.failed == self.evaluated
    }
}

/// Outcome of a search run.
///
/// A run in which no evaluation ever succeeded is still a valid result: its
/// `best_chromosome` and `best_model` are `None` and `best_score` is
/// [`SENTINEL_SCORE`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct RunResult {
    pub family: String,
    pub task: TaskKind,
    pub best_chromosome: Option<Chromosome>,
    pub best_score: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub best_model: Option<ModelHandle>,
    /// Raw best score of each generation, [`SENTINEL_SCORE`] where all failed.
    pub generation_scores: Vec<f64>,
    pub generation_records: Vec<GenerationRecord>,
}

impl RunResult {
    pub fn found_solution(&self) -> bool {
        self.best_chromosome.is_some()
    }
}
