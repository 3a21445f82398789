//! Diagnostics and statistics
//!
//! This module provides statistics collection for evolutionary runs and the
//! progress log written while a run is under way.

pub mod progress;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;

pub use progress::ProgressLog;

/// Statistics for a single generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness in this generation
    pub best_fitness: f64,
    /// Worst fitness in this generation
    pub worst_fitness: f64,
    /// Mean fitness
    pub mean_fitness: f64,
    /// Mean fitness of the elites
    pub elite_mean_fitness: f64,
    /// Fitness standard deviation
    pub fitness_std: f64,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent on fitness evaluation (ms)
    pub evaluation_ms: f64,
    /// Time spent on selection (ms)
    pub selection_ms: f64,
    /// Time spent on crossover and mutation (ms)
    pub variation_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set evaluation time
    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set selection time
    pub fn with_selection(mut self, duration: Duration) -> Self {
        self.selection_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set variation time
    pub fn with_variation(mut self, duration: Duration) -> Self {
        self.variation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    /// Compute statistics from a population
    pub fn from_population<G, F>(
        population: &Population<G, F>,
        generation: usize,
        evaluations: usize,
    ) -> Self
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
    {
        let fitnesses: Vec<f64> = population
            .iter()
            .filter_map(|i| i.fitness.as_ref().map(|f| f.to_f64()))
            .collect();

        let best = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            generation,
            evaluations,
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: population.mean_fitness().unwrap_or(0.0),
            elite_mean_fitness: population.elite_mean_fitness().unwrap_or(0.0),
            fitness_std: population.fitness_std().unwrap_or(0.0),
            timing: TimingStats::default(),
        }
    }

    /// Set timing information
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Statistics collector for an entire evolution run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the best fitness across all generations
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Get the final best fitness
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    /// Set the termination reason
    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the evolution run
    pub fn summary(&self) -> String {
        let best = self.best_fitness().unwrap_or(f64::NEG_INFINITY);
        let final_best = self.final_best_fitness().unwrap_or(f64::NEG_INFINITY);

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Final best: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.num_generations(),
            best,
            final_best,
            self.total_runtime_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult<G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// The fittest genome of the final population
    pub best_genome: G,
    /// Its fitness value
    pub best_fitness: F,
    /// Number of generations evolved
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Statistics for the run
    pub stats: EvolutionStats,
    /// Ordered run log: parameters, progress snapshots, final report
    pub log: Vec<String>,
}

impl<G, F> EvolutionResult<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Create a new evolution result
    pub fn new(best_genome: G, best_fitness: F, generations: usize, evaluations: usize) -> Self {
        Self {
            best_genome,
            best_fitness,
            generations,
            evaluations,
            stats: EvolutionStats::new(),
            log: Vec::new(),
        }
    }

    /// Add statistics to the result
    pub fn with_stats(mut self, stats: EvolutionStats) -> Self {
        self.stats = stats;
        self
    }

    /// Add the run log to the result
    pub fn with_log(mut self, log: Vec<String>) -> Self {
        self.log = log;
        self
    }

    /// Why the run stopped
    pub fn termination_reason(&self) -> Option<&str> {
        self.stats.termination_reason.as_deref()
    }
}

pub mod prelude {
    pub use super::progress::ProgressLog;
    pub use super::{EvolutionResult, EvolutionStats, GenerationStats, TimingStats};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::candidate::{Candidate, ChordLayout};
    use crate::genome::traits::EvolutionaryGenome;
    use crate::pitch::Voicing;
    use crate::population::individual::Individual;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_population() -> Population<Candidate> {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = ChordLayout::new(Voicing::satb(), 2);
        let individuals = [0.2, 0.4, -0.6, 0.8, 0.2]
            .iter()
            .map(|&f| Individual::with_fitness(Candidate::generate(&mut rng, &layout), f))
            .collect();
        Population::from_individuals(individuals, 5, 0.4)
    }

    fn stats_with_best(generation: usize, best: f64) -> GenerationStats {
        GenerationStats {
            generation,
            evaluations: generation * 10,
            best_fitness: best,
            worst_fitness: 0.0,
            mean_fitness: 0.0,
            elite_mean_fitness: best / 2.0,
            fitness_std: 0.0,
            timing: TimingStats::default(),
        }
    }

    #[test]
    fn test_generation_stats_from_population() {
        let pop = create_test_population();
        let stats = GenerationStats::from_population(&pop, 10, 100);

        assert_eq!(stats.generation, 10);
        assert_eq!(stats.evaluations, 100);
        assert_eq!(stats.best_fitness, 0.8);
        assert_eq!(stats.worst_fitness, -0.6);
        assert!((stats.mean_fitness - 0.2).abs() < 1e-12);
        assert!((stats.elite_mean_fitness - 0.6).abs() < 1e-12);
        assert!(stats.fitness_std > 0.0);
    }

    #[test]
    fn test_generation_stats_empty_population() {
        let pop: Population<Candidate> = Population::new(4, 0.5);
        let stats = GenerationStats::from_population(&pop, 0, 0);

        assert_eq!(stats.best_fitness, f64::NEG_INFINITY);
        assert_eq!(stats.worst_fitness, f64::INFINITY);
        assert_eq!(stats.mean_fitness, 0.0);
    }

    #[test]
    fn test_evolution_stats_history() {
        let mut stats = EvolutionStats::new();
        for (i, best) in [0.1, 0.3, 0.2, 0.9].into_iter().enumerate() {
            stats.record(stats_with_best(i, best));
        }

        assert_eq!(stats.num_generations(), 4);
        assert_eq!(stats.best_fitness(), Some(0.9));
        assert_eq!(stats.final_best_fitness(), Some(0.9));
    }

    #[test]
    fn test_evolution_stats_summary() {
        let mut stats = EvolutionStats::new();
        stats.record(stats_with_best(0, 0.5));
        stats.set_termination_reason("Target fitness reached");
        stats.set_runtime(Duration::from_millis(1234));

        let summary = stats.summary();
        assert!(summary.contains("Generations: 1"));
        assert!(summary.contains("Best fitness: 0.5"));
        assert!(summary.contains("Target fitness reached"));
    }

    #[test]
    fn test_timing_stats() {
        let timing = TimingStats::new()
            .with_evaluation(Duration::from_millis(100))
            .with_selection(Duration::from_millis(20))
            .with_variation(Duration::from_millis(30))
            .with_total(Duration::from_millis(150));

        assert!((timing.evaluation_ms - 100.0).abs() < 0.1);
        assert!((timing.selection_ms - 20.0).abs() < 0.1);
        assert!((timing.variation_ms - 30.0).abs() < 0.1);
        assert!((timing.total_ms - 150.0).abs() < 0.1);
    }

    #[test]
    fn test_evolution_result() {
        let pop = create_test_population();
        let best = pop.best().unwrap().clone();
        let mut stats = EvolutionStats::new();
        stats.set_termination_reason("Maximum generations reached");

        let result = EvolutionResult::new(best.genome, 0.8, 100, 1000)
            .with_stats(stats)
            .with_log(vec!["generation = 100".to_string()]);

        assert_eq!(result.best_fitness, 0.8);
        assert_eq!(result.generations, 100);
        assert_eq!(result.evaluations, 1000);
        assert_eq!(result.termination_reason(), Some("Maximum generations reached"));
        assert_eq!(result.log.len(), 1);
    }
}
