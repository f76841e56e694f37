pub mod selection_strategy;
pub mod tournament;

pub use selection_strategy::SelectionStrategy;
pub use tournament::{TournamentOutcome, TournamentSelection};
