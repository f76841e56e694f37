use std::fmt::Debug;

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::fitness::Evaluation;
use crate::rng::RandomNumberGenerator;

/// Trait for parent selection strategies.
///
/// Selection strategies choose the parents of the next generation from the
/// evaluated population. All randomness comes from the `rng` passed in, which
/// the orchestrator owns for the whole run.
///
/// # Examples
///
/// ```
/// use hyperga::chromosome::{Chromosome, Gene};
/// use hyperga::fitness::{Evaluation, FailureReason, ModelHandle};
/// use hyperga::rng::RandomNumberGenerator;
/// use hyperga::schema::ParamValue;
/// use hyperga::selection::{SelectionStrategy, TournamentSelection};
///
/// let population: Vec<Chromosome> = (0..4)
///     .map(|i| Chromosome::from_genes(vec![Gene::new("x", ParamValue::Integer(i))]))
///     .collect();
/// let fitness = vec![
///     Evaluation::Scored { score: 0.2, model: ModelHandle::new(()) },
///     Evaluation::Failed(FailureReason::Trainer("diverged".into())),
///     Evaluation::Scored { score: 0.9, model: ModelHandle::new(()) },
///     Evaluation::Scored { score: 0.5, model: ModelHandle::new(()) },
/// ];
///
/// let mut rng = RandomNumberGenerator::from_seed(42);
/// let parents = TournamentSelection::default()
///     .select(&population, &fitness, 4, &mut rng)
///     .unwrap();
/// assert_eq!(parents.len(), 4);
/// ```
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Selects `num_to_select` parents, duplicates allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is empty or the fitness slice length
    /// doesn't match the population length.
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[Evaluation],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>>;
}
