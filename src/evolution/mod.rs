pub mod launcher;
pub mod options;
pub mod record;

pub use launcher::GeneticSearch;
pub use options::{LogLevel, SearchOptions, SearchOptionsBuilder};
pub use record::{GenerationRecord, RunResult, ScoreSummary, ScoredCandidate};
