//! # Report
//!
//! Turns a [`RunResult`] into numbers fit for display. The engine keeps raw
//! sentinel scores internally; this is the one place they are replaced.
//!
//! ```rust
//! use hyperga::report::sanitize_score;
//!
//! assert_eq!(sanitize_score(f64::NEG_INFINITY), 0.0);
//! assert_eq!(sanitize_score(0.93), 0.93);
//! ```

use std::collections::BTreeMap;

use crate::chromosome::Chromosome;
use crate::dataset::TaskKind;
use crate::evolution::RunResult;
use crate::schema::{families, ParamValue};

/// Message reported when no evaluation of a run succeeded.
pub const NO_SOLUTION_MESSAGE: &str = "No valid hyperparameters found.";

/// Message reported for a run with a best configuration.
pub const SOLUTION_MESSAGE: &str = "Optimization complete.";

/// Display value of one hyperparameter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Integer(i64),
    Real(f64),
    Layers(Vec<usize>),
}

/// Externally visible summary of a run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub model_type: String,
    pub task_type: TaskKind,
    /// Rounded to four places; zero when no solution was found.
    pub best_score: f64,
    pub best_params: Option<BTreeMap<String, DisplayValue>>,
    /// One per generation, failures shown as zero.
    pub generation_scores: Vec<f64>,
    pub message: String,
}

impl RunReport {
    pub fn from_result(result: &RunResult) -> Self {
        let best_params = result
            .best_chromosome
            .as_ref()
            .map(|chromosome| display_parameters(&result.family, chromosome));
        let message = if best_params.is_some() {
            SOLUTION_MESSAGE
        } else {
            NO_SOLUTION_MESSAGE
        };

        Self {
            model_type: result.family.clone(),
            task_type: result.task,
            best_score: round_to(sanitize_score(result.best_score), 4),
            best_params,
            generation_scores: result
                .generation_scores
                .iter()
                .map(|&s| sanitize_score(s))
                .collect(),
            message: message.to_string(),
        }
    }

    pub fn found_solution(&self) -> bool {
        self.best_params.is_some()
    }
}

/// Replaces a non-finite score with zero.
pub fn sanitize_score(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn decimals_for(family: &str, name: &str) -> i32 {
    match (family, name) {
        (families::SVM, "tol") => 6,
        (families::NEURAL_NETWORK, "alpha" | "learning_rate_init") => 6,
        _ => 4,
    }
}

/// Formats the genes of `chromosome` the way `family`'s parameters are shown.
///
/// Integers are shown as integers and reals rounded; a feedforward network
/// shows its hidden layers as one list of widths.
pub fn display_parameters(
    family: &str,
    chromosome: &Chromosome,
) -> BTreeMap<String, DisplayValue> {
    let mut params = BTreeMap::new();

    if family == families::NEURAL_NETWORK {
        let count = chromosome
            .get("hidden_layer_sizes")
            .map_or(1, |v| v.as_i64());
        let width = chromosome.get("layer_size").map_or(0, |v| v.as_i64());
        let count = usize::try_from(count).unwrap_or(0);
        let layers = vec![usize::try_from(width).unwrap_or(0); count];
        params.insert("hidden_layer_sizes".to_string(), DisplayValue::Layers(layers));
    }

    for gene in chromosome.genes() {
        if family == families::NEURAL_NETWORK
            && (gene.name == "hidden_layer_sizes" || gene.name == "layer_size")
        {
            continue;
        }
        let value = match gene.value {
            ParamValue::Integer(v) => DisplayValue::Integer(v),
            ParamValue::Real(v) => {
                DisplayValue::Real(round_to(v, decimals_for(family, &gene.name)))
            }
        };
        params.insert(gene.name.clone(), value);
    }
    params
}
