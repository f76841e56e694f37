use crate::chromosome::Chromosome;
use crate::error::{Result, SearchError};
use crate::fitness::Evaluation;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::SelectionStrategy;

/// Default number of participants per tournament.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// A selection strategy that selects parents through tournament selection.
///
/// Each tournament draws `tournament_size` distinct individuals uniformly at
/// random and keeps the best one. Tournaments are independent of each other, so
/// a strong individual can win several of them and appear more than once among
/// the parents.
///
/// - Smaller tournament sizes lead to more exploration (more random selection)
/// - Larger tournament sizes lead to more exploitation (more focus on the best individuals)
///
/// A failed evaluation loses against any scored one. Between equal scores the
/// participant drawn first wins.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    tournament_size: usize,
}

/// Indices drawn for one tournament and the index that won it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentOutcome {
    pub participants: Vec<usize>,
    pub winner: usize,
}

impl TournamentSelection {
    /// Creates a new TournamentSelection strategy with the specified tournament size.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(SearchError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    pub fn with_tournament_size(mut self, tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(SearchError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        self.tournament_size = tournament_size;
        Ok(self)
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament over `fitness`.
    ///
    /// The tournament size is clamped to the population size.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::EmptyPopulation` if `fitness` is empty.
    pub fn run_tournament(
        &self,
        fitness: &[Evaluation],
        rng: &mut RandomNumberGenerator,
    ) -> Result<TournamentOutcome> {
        let participants = rng.sample_distinct(fitness.len(), self.tournament_size);
        let (&first, rest) = participants
            .split_first()
            .ok_or(SearchError::EmptyPopulation)?;

        let mut winner = first;
        for &idx in rest {
            if fitness[idx].beats(&fitness[winner]) {
                winner = idx;
            }
        }

        Ok(TournamentOutcome {
            participants,
            winner,
        })
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self {
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
        }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[Evaluation],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>> {
        if population.is_empty() {
            return Err(SearchError::EmptyPopulation);
        }

        if fitness.len() != population.len() {
            return Err(SearchError::Configuration(format!(
                "Fitness vector length ({}) doesn't match population length ({})",
                fitness.len(),
                population.len()
            )));
        }

        (0..num_to_select)
            .map(|_| {
                let outcome = self.run_tournament(fitness, rng)?;
                Ok(population[outcome.winner].clone())
            })
            .collect()
    }
}
