//! # Error Types
//!
//! This module defines the error types for the hyperparameter search engine.
//! Only configuration problems surface as errors from a search run; failures of
//! individual trainings are absorbed by the fitness adapter and never reach the
//! caller as a `SearchError`.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use hyperga::error::{Result, SearchError};
//!
//! fn check_generations(generations: usize) -> Result<()> {
//!     if generations == 0 {
//!         return Err(SearchError::Configuration("generations must be at least 1".into()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_generations(0).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use hyperga::error::{OptionExt, SearchError};
//!
//! fn first_score(scores: &[f64]) -> hyperga::error::Result<f64> {
//!     scores.first().copied().ok_or_else_search(|| SearchError::EmptyPopulation)
//! }
//!
//! assert!(first_score(&[]).is_err());
//! ```

use thiserror::Error;

/// Errors that can be returned by the search engine and its collaborators.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The requested model family is not registered in the hyperparameter schema.
    #[error("Unknown model family: {0}")]
    UnknownModelFamily(String),

    /// The model family has a schema entry but no trainer was registered for it.
    #[error("No trainer registered for model family: {0}")]
    MissingTrainer(String),

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A hyperparameter range whose bounds are reversed or not finite.
    #[error("Invalid range for '{name}': [{low}, {high}]")]
    InvalidRange { name: String, low: f64, high: f64 },

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Malformed or inconsistent dataset.
    #[error("Dataset error: {0}")]
    Dataset(String),
}

impl SearchError {
    /// Returns `true` for errors caused by the request or engine setup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SearchError::UnknownModelFamily(_)
                | SearchError::MissingTrainer(_)
                | SearchError::Configuration(_)
                | SearchError::InvalidRange { .. }
        )
    }
}

/// A specialized Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an Option to a Result, using `err_fn` to build the error.
    fn ok_or_else_search<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SearchError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_search<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SearchError,
    {
        self.ok_or_else(err_fn)
    }
}
