//! Termination criteria
//!
//! This module provides the stopping rules of the search loop. They are
//! checked at the top of every generation, the initial one included.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::fitness::traits::FitnessValue;
use crate::genome::candidate::Candidate;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a, G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Current generation number
    pub generation: usize,
    /// Fittest individual of the current population
    pub best: &'a Individual<G, F>,
}

/// Termination criterion trait
pub trait TerminationCriterion<G: EvolutionaryGenome, F: FitnessValue = f64>: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState<G, F>) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when the fittest candidate reaches the target fitness and
/// every one of its slots is a recognised chord
#[derive(Clone, Debug)]
pub struct ChordalTarget {
    /// Target fitness value
    pub target: f64,
}

impl ChordalTarget {
    /// Create a new chordal target criterion
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl<F: FitnessValue> TerminationCriterion<Candidate, F> for ChordalTarget {
    fn should_terminate(&self, state: &EvolutionState<Candidate, F>) -> bool {
        state.best.fitness_f64() >= self.target && !state.best.genome.has_non_chord()
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Terminate when an external flag is raised
#[derive(Clone, Debug, Default)]
pub struct Cancelled(pub Arc<AtomicBool>);

impl Cancelled {
    /// Watch the given flag
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }

    /// Whether the flag is raised
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl<G: EvolutionaryGenome, F: FitnessValue> TerminationCriterion<G, F> for Cancelled {
    fn should_terminate(&self, _state: &EvolutionState<G, F>) -> bool {
        self.is_cancelled()
    }

    fn reason(&self) -> &'static str {
        "Cancelled"
    }
}

/// Combine criteria with OR logic, in priority order
pub struct AnyOf<G: EvolutionaryGenome, F: FitnessValue = f64> {
    criteria: Vec<Box<dyn TerminationCriterion<G, F>>>,
}

impl<G: EvolutionaryGenome, F: FitnessValue> AnyOf<G, F> {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion<G, F>>>) -> Self {
        Self { criteria }
    }

    /// The first criterion that fires, if any
    pub fn first_triggered(&self, state: &EvolutionState<G, F>) -> Option<&dyn TerminationCriterion<G, F>> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.as_ref())
    }
}

pub mod prelude {
    pub use super::{
        AnyOf, Cancelled, ChordalTarget, EvolutionState, MaxGenerations, TerminationCriterion,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{Pitch, Pitch::*, Voicing};

    fn create_test_state(
        generation: usize,
        best: &Individual<Candidate>,
    ) -> EvolutionState<'_, Candidate> {
        EvolutionState { generation, best }
    }

    fn fittest(chords: &[&[Pitch]], fitness: f64) -> Individual<Candidate> {
        let genome = Candidate::from_chords(Arc::new(Voicing::satb()), chords).unwrap();
        Individual::with_fitness(genome, fitness)
    }

    #[test]
    fn test_max_generations() {
        let best = fittest(&[&[C5, G4, E4, C3]], 0.5);
        let criterion = MaxGenerations::new(100);

        assert!(!criterion.should_terminate(&create_test_state(50, &best)));
        assert!(criterion.should_terminate(&create_test_state(100, &best)));
        assert!(criterion.should_terminate(&create_test_state(150, &best)));
    }

    #[test]
    fn test_chordal_target() {
        let criterion = ChordalTarget::new(0.98);

        let best = fittest(&[&[C5, G4, E4, C3]], 0.99);
        assert!(criterion.should_terminate(&create_test_state(0, &best)));

        let best = fittest(&[&[C5, G4, E4, C3]], 0.97);
        assert!(!criterion.should_terminate(&create_test_state(0, &best)));
    }

    #[test]
    fn test_chordal_target_rejects_non_chords() {
        // [E5, C5, D4, C3] is not a chord, so its progression carries an X
        let best = fittest(&[&[C5, G4, E4, C3], &[E5, C5, D4, C3]], 1.0);
        assert!(best.genome.has_non_chord());
        let criterion = ChordalTarget::new(0.98);
        assert!(!criterion.should_terminate(&create_test_state(0, &best)));
    }

    #[test]
    fn test_cancelled() {
        let best = fittest(&[&[C5, G4, E4, C3]], 0.5);
        let criterion = Cancelled::default();
        assert!(!TerminationCriterion::<Candidate>::should_terminate(
            &criterion,
            &create_test_state(0, &best)
        ));

        let flag = Arc::clone(&criterion.0);
        flag.store(true, Ordering::Relaxed);
        assert!(criterion.is_cancelled());
        assert!(TerminationCriterion::<Candidate>::should_terminate(
            &criterion,
            &create_test_state(0, &best)
        ));
    }

    #[test]
    fn test_any_of_reports_first() {
        let best = fittest(&[&[C5, G4, E4, C3]], 0.99);
        let criterion: AnyOf<Candidate> = AnyOf::new(vec![
            Box::new(ChordalTarget::new(0.98)),
            Box::new(MaxGenerations::new(100)),
        ]);

        let fired = criterion.first_triggered(&create_test_state(100, &best)).unwrap();
        assert_eq!(fired.reason(), "Target fitness reached");

        let best = fittest(&[&[C5, G4, E4, C3]], 0.5);
        assert!(criterion.first_triggered(&create_test_state(50, &best)).is_none());
        let fired = criterion.first_triggered(&create_test_state(100, &best)).unwrap();
        assert_eq!(fired.reason(), "Maximum generations reached");
    }
}
