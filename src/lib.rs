pub mod caching;
pub mod chromosome;
pub mod dataset;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod metrics;
pub mod population;
pub mod report;
pub mod rng;
pub mod schema;
pub mod selection;
pub mod strategy;

// Re-export commonly used types for convenience
pub use error::{OptionExt, Result, SearchError};
pub use evolution::{GeneticSearch, RunResult, SearchOptions};
