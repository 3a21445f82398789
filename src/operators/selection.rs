//! Selection operators
//!
//! This module provides tournament selection, the parent-selection scheme
//! of the search loop.

use rand::seq::index;
use rand::Rng;

use crate::genome::traits::EvolutionaryGenome;
use crate::operators::traits::SelectionOperator;

/// Tournament selection operator
///
/// Samples `tournament_size` distinct individuals and keeps the fittest.
/// On ties the first one drawn wins.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::binary()
    }
}

impl<G: EvolutionaryGenome> SelectionOperator<G> for TournamentSelection {
    fn select<R: Rng>(&self, population: &[(G, f64)], rng: &mut R) -> usize {
        assert!(!population.is_empty(), "Population cannot be empty");

        let tournament_size = self.tournament_size.min(population.len());
        let mut contenders = index::sample(rng, population.len(), tournament_size).into_iter();

        let first = contenders.next().unwrap_or(0);
        contenders.fold(first, |best, idx| {
            if population[idx].1 > population[best].1 {
                idx
            } else {
                best
            }
        })
    }
}
