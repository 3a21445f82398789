//! Operator traits
//!
//! This module defines the core operator traits for genetic algorithms.
//! Operators never modify their inputs: every variation returns new genomes.

use rand::Rng;

use crate::error::OperatorResult;
use crate::genome::traits::EvolutionaryGenome;

/// Selection operator trait
///
/// Selects individuals from a population for reproduction.
pub trait SelectionOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(
        &self,
        population: &[(G, f64)], // (genome, fitness) pairs
        rng: &mut R,
    ) -> usize;
}

/// Crossover operator trait
///
/// Combines genetic material from two parents to create offspring.
pub trait CrossoverOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Apply crossover to two parents and produce two offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &G,
        parent2: &G,
        rng: &mut R,
    ) -> OperatorResult<(G, G)>;
}

/// Mutation operator trait
///
/// Produces a randomly changed copy of a genome.
pub trait MutationOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Apply mutation, returning the mutated copy
    fn mutate<R: Rng>(&self, genome: &G, rng: &mut R) -> OperatorResult<G>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperatorResult;
    use crate::genome::candidate::Candidate;
    use crate::pitch::{Pitch, Voicing};
    use std::sync::Arc;

    // Mock selection operator for testing
    struct MockSelection;

    impl SelectionOperator<Candidate> for MockSelection {
        fn select<R: Rng>(&self, population: &[(Candidate, f64)], rng: &mut R) -> usize {
            rng.gen_range(0..population.len())
        }
    }

    // Mock crossover operator for testing
    struct MockCrossover;

    impl CrossoverOperator<Candidate> for MockCrossover {
        fn crossover<R: Rng>(
            &self,
            parent1: &Candidate,
            parent2: &Candidate,
            _rng: &mut R,
        ) -> OperatorResult<(Candidate, Candidate)> {
            // Just swap parents as a simple crossover
            OperatorResult::Success((parent2.clone(), parent1.clone()))
        }
    }

    fn population(rng: &mut impl Rng) -> Vec<(Candidate, f64)> {
        (0..10)
            .map(|i| {
                (
                    Candidate::random(rng, Arc::new(Voicing::satb()), 2),
                    i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn test_mock_selection() {
        let mut rng = rand::thread_rng();
        let population = population(&mut rng);

        for _ in 0..5 {
            assert!(MockSelection.select(&population, &mut rng) < population.len());
        }
    }

    #[test]
    fn test_mock_crossover() {
        let mut rng = rand::thread_rng();
        let voicing = Arc::new(Voicing::satb());
        let parent1 =
            Candidate::new(Arc::clone(&voicing), vec![Pitch::C5, Pitch::G4, Pitch::E4, Pitch::C3])
                .unwrap();
        let parent2 =
            Candidate::new(voicing, vec![Pitch::B4, Pitch::G4, Pitch::D4, Pitch::G2]).unwrap();

        let crossover = MockCrossover;
        let result = crossover.crossover(&parent1, &parent2, &mut rng);
        assert!(result.is_ok());

        let (child1, child2) = result.genome().unwrap();
        assert_eq!(child1, parent2);
        assert_eq!(child2, parent1);
    }
}
