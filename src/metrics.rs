//! Validation metrics for trainers. Both are "higher is better", which is the
//! direction the search maximises.

use crate::dataset::TaskKind;
use crate::error::{Result, SearchError};

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(SearchError::Dataset("Cannot score an empty split".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(SearchError::Dataset(format!(
            "{} targets but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

/// Fraction of predictions equal to their target.
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(hits as f64 / y_true.len() as f64)
}

/// Mean squared error, negated.
pub fn negative_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    Ok(-(sum / y_true.len() as f64))
}

/// Accuracy for classification, negative MSE for regression.
pub fn score_for(task: TaskKind, y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    match task {
        TaskKind::Classification => accuracy(y_true, y_pred),
        TaskKind::Regression => negative_mean_squared_error(y_true, y_pred),
    }
}
