//! Population type
//!
//! This module provides the elitist Population container: a capacity-bounded
//! list of individuals that seeds each next generation with its top
//! `⌈elitism_rate × size⌉` members.

use std::cmp::Ordering;

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fitness::traits::{Fitness, FitnessValue};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;

const ELITE_EPSILON: f64 = 1e-9;

fn by_fitness_desc<G, F>(a: &Individual<G, F>, b: &Individual<G, F>) -> Ordering
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    b.fitness_f64()
        .partial_cmp(&a.fitness_f64())
        .unwrap_or(Ordering::Equal)
}

/// A capacity-bounded elitist population
#[derive(Clone, Debug)]
pub struct Population<G, F = f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// The individuals in this population
    individuals: Vec<Individual<G, F>>,
    /// Maximum number of individuals
    capacity: usize,
    /// Fraction of the population carried into the next generation
    elitism_rate: f64,
    /// Current generation number
    generation: usize,
}

impl<G, F> Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Create an empty population
    pub fn new(capacity: usize, elitism_rate: f64) -> Self {
        assert!(capacity >= 1, "Population capacity must be at least 1");
        assert!(
            (0.0..=1.0).contains(&elitism_rate),
            "Elitism rate must be in [0, 1]"
        );
        Self {
            individuals: Vec::with_capacity(capacity),
            capacity,
            elitism_rate,
            generation: 0,
        }
    }

    /// Create a population from a vector of individuals
    ///
    /// Individuals beyond the capacity are dropped.
    pub fn from_individuals(
        mut individuals: Vec<Individual<G, F>>,
        capacity: usize,
        elitism_rate: f64,
    ) -> Self {
        let mut population = Self::new(capacity, elitism_rate);
        individuals.truncate(capacity);
        population.individuals = individuals;
        population
    }

    /// Create a full random population
    pub fn random<R: Rng>(
        capacity: usize,
        elitism_rate: f64,
        layout: &G::Layout,
        rng: &mut R,
    ) -> Self {
        let mut population = Self::new(capacity, elitism_rate);
        population
            .individuals
            .extend((0..capacity).map(|_| Individual::new(G::generate(rng, layout))));
        population
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Maximum number of individuals
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Elitism rate
    pub fn elitism_rate(&self) -> f64 {
        self.elitism_rate
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Check if the population has reached its capacity
    pub fn is_full(&self) -> bool {
        self.individuals.len() >= self.capacity
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual<G, F>> {
        self.individuals.get(index)
    }

    /// Add an individual, returning false if the population is full
    pub fn push(&mut self, individual: Individual<G, F>) -> bool {
        if self.is_full() {
            return false;
        }
        self.individuals.push(individual);
        true
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual<G, F>> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual<G, F>] {
        &self.individuals
    }

    /// Get the best individual (by fitness)
    ///
    /// On ties the earliest individual wins.
    pub fn best(&self) -> Option<&Individual<G, F>> {
        self.individuals
            .iter()
            .filter(|i| i.is_evaluated())
            .fold(None, |best: Option<&Individual<G, F>>, i| match best {
                Some(b) if b.fitness_f64() >= i.fitness_f64() => Some(b),
                _ => Some(i),
            })
    }

    /// Sort the population by fitness (best first, stable)
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(by_fitness_desc);
    }

    /// Number of elites: `⌈elitism_rate × size⌉`, clamped to the size
    ///
    /// Products within `1e-9` of an integer count as that integer, so
    /// `0.07 × 100` gives 7 elites.
    pub fn elite_count(&self) -> usize {
        let product = self.elitism_rate * self.len() as f64;
        let count = (product - ELITE_EPSILON).ceil().max(0.0) as usize;
        count.min(self.len())
    }

    /// The top `elite_count()` individuals, best first
    pub fn elites(&self) -> Vec<&Individual<G, F>> {
        self.top(self.elite_count())
    }

    fn top(&self, n: usize) -> Vec<&Individual<G, F>> {
        let mut ranked: Vec<&Individual<G, F>> = self.individuals.iter().collect();
        ranked.sort_by(|a, b| by_fitness_desc(a, b));
        ranked.truncate(n);
        ranked
    }

    /// Empty population of the next generation, seeded with this
    /// population's elites (fitness retained)
    pub fn next_generation(&self) -> Self {
        let mut next = Self::new(self.capacity, self.elitism_rate);
        next.generation = self.generation + 1;
        next.individuals
            .extend(self.elites().into_iter().cloned().take(self.capacity));
        next
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Get genome-fitness pairs as owned tuples
    pub fn as_fitness_pairs(&self) -> Vec<(G, f64)> {
        self.individuals
            .iter()
            .filter_map(|i| i.fitness.as_ref().map(|f| (i.genome.clone(), f.to_f64())))
            .collect()
    }

    /// Evaluate unevaluated individuals (sequential)
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness<Genome = G, Value = F>,
    {
        let mut evaluated = 0;
        for individual in self.individuals.iter_mut().filter(|i| !i.is_evaluated()) {
            individual.set_fitness(fitness.evaluate(&individual.genome));
            evaluated += 1;
        }
        evaluated
    }

    /// Compute mean fitness
    pub fn mean_fitness(&self) -> Option<f64> {
        mean(self.individuals.iter())
    }

    /// Compute mean fitness of the elites, or of the fittest individual
    /// when there are none
    pub fn elite_mean_fitness(&self) -> Option<f64> {
        mean(self.top(self.elite_count().max(1)).into_iter())
    }

    /// Compute fitness standard deviation
    pub fn fitness_std(&self) -> Option<f64> {
        let mean = self.mean_fitness()?;
        let evaluated: Vec<f64> = self
            .individuals
            .iter()
            .filter_map(|i| i.fitness.as_ref().map(|f| f.to_f64()))
            .collect();

        if evaluated.len() < 2 {
            return None;
        }

        let variance = evaluated.iter().map(|f| (f - mean).powi(2)).sum::<f64>()
            / (evaluated.len() - 1) as f64;
        Some(variance.sqrt())
    }
}

fn mean<'a, G, F>(individuals: impl Iterator<Item = &'a Individual<G, F>>) -> Option<f64>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    let (sum, n) = individuals
        .filter_map(|i| i.fitness.as_ref().map(|f| f.to_f64()))
        .fold((0.0, 0usize), |(s, n), f| (s + f, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl<G, F> Population<G, F>
where
    G: EvolutionaryGenome + Send + Sync,
    F: FitnessValue + Send,
{
    /// Evaluate unevaluated individuals in parallel
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness<Genome = G, Value = F> + Sync,
    {
        self.individuals
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .map(|individual| {
                let f = fitness.evaluate(&individual.genome);
                individual.set_fitness(f);
                1
            })
            .sum()
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl<G, F> Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    /// Evaluate unevaluated individuals (sequential fallback)
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness<Genome = G, Value = F>,
    {
        self.evaluate(fitness)
    }
}

impl<G, F> std::ops::Index<usize> for Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    type Output = Individual<G, F>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<G, F> IntoIterator for Population<G, F>
where
    G: EvolutionaryGenome,
    F: FitnessValue,
{
    type Item = Individual<G, F>;
    type IntoIter = std::vec::IntoIter<Individual<G, F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::rule_set::RuleSet;
    use crate::genome::candidate::{Candidate, ChordLayout};
    use crate::pitch::Voicing;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layout() -> ChordLayout {
        ChordLayout::new(Voicing::satb(), 3)
    }

    fn create_test_population(elitism_rate: f64) -> Population<Candidate> {
        let mut rng = StdRng::seed_from_u64(42);
        let individuals = [0.1, 0.5, -0.3, 0.9, 0.5]
            .iter()
            .map(|&f| Individual::with_fitness(Candidate::generate(&mut rng, &layout()), f))
            .collect();
        Population::from_individuals(individuals, 5, elitism_rate)
    }

    #[test]
    fn test_population_random() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop: Population<Candidate> = Population::random(10, 0.2, &layout(), &mut rng);

        assert_eq!(pop.len(), 10);
        assert!(pop.is_full());
        assert!(!pop.all_evaluated());
        assert!(pop.iter().all(|i| i.genome.chord_count() == 3));
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pop: Population<Candidate> = Population::new(2, 0.5);
        assert!(pop.push(Individual::new(Candidate::generate(&mut rng, &layout()))));
        assert!(pop.push(Individual::new(Candidate::generate(&mut rng, &layout()))));
        assert!(!pop.push(Individual::new(Candidate::generate(&mut rng, &layout()))));
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_population_best() {
        let pop = create_test_population(0.2);
        assert_eq!(pop.best().unwrap().fitness_f64(), 0.9);
    }

    #[test]
    fn test_sort_by_fitness_is_stable() {
        let mut pop = create_test_population(0.2);
        let second = pop[1].genome.clone();
        let fifth = pop[4].genome.clone();
        pop.sort_by_fitness();

        let fitnesses: Vec<f64> = pop.iter().map(|i| i.fitness_f64()).collect();
        assert_eq!(fitnesses, vec![0.9, 0.5, 0.5, 0.1, -0.3]);
        assert_eq!(pop[1].genome, second);
        assert_eq!(pop[2].genome, fifth);
    }

    #[test]
    fn test_elite_count_rounds_up() {
        assert_eq!(create_test_population(0.0).elite_count(), 0);
        assert_eq!(create_test_population(0.2).elite_count(), 1);
        assert_eq!(create_test_population(0.25).elite_count(), 2);
        assert_eq!(create_test_population(1.0).elite_count(), 5);
    }

    #[test]
    fn test_next_generation_keeps_elites() {
        let pop = create_test_population(0.5);
        let next = pop.next_generation();

        assert_eq!(next.generation(), 1);
        assert_eq!(next.capacity(), 5);
        assert_eq!(next.len(), 3);
        let elites: Vec<f64> = next.iter().map(|i| i.fitness_f64()).collect();
        assert_eq!(elites, vec![0.9, 0.5, 0.5]);
        assert!(next.all_evaluated());
    }

    #[test]
    fn test_mean_and_elite_mean() {
        let pop = create_test_population(0.4);
        assert!((pop.mean_fitness().unwrap() - 0.34).abs() < 1e-12);
        assert!((pop.elite_mean_fitness().unwrap() - 0.7).abs() < 1e-12);

        let empty: Population<Candidate> = Population::new(3, 0.4);
        assert_eq!(empty.mean_fitness(), None);
    }

    #[test]
    fn test_population_evaluate() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pop: Population<Candidate> = Population::random(6, 0.2, &layout(), &mut rng);

        let rules = RuleSet::all();
        assert_eq!(pop.evaluate(&rules), 6);
        assert!(pop.all_evaluated());
        // already evaluated individuals are skipped
        assert_eq!(pop.evaluate(&rules), 0);
        for i in pop.iter() {
            assert_eq!(i.fitness_f64(), rules.fitness(&i.genome));
        }
    }

    #[test]
    fn test_population_evaluate_parallel() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut pop: Population<Candidate> = Population::random(100, 0.2, &layout(), &mut rng);

        let rules = RuleSet::all();
        assert_eq!(pop.evaluate_parallel(&rules), 100);
        assert!(pop.all_evaluated());
        for i in pop.iter() {
            assert_eq!(i.fitness_f64(), rules.fitness(&i.genome));
        }
    }

    #[test]
    fn test_as_fitness_pairs_skips_unevaluated() {
        let mut pop = create_test_population(0.2);
        let mut rng = StdRng::seed_from_u64(5);
        pop.capacity = 6;
        pop.push(Individual::new(Candidate::generate(&mut rng, &layout())));
        assert_eq!(pop.as_fitness_pairs().len(), 5);
    }

    #[test]
    fn test_elite_count_ignores_float_noise() {
        let mut rng = StdRng::seed_from_u64(6);
        // 0.07 * 100.0 == 7.000000000000001
        let pop: Population<Candidate> = Population::random(100, 0.07, &layout(), &mut rng);
        assert_eq!(pop.elite_count(), 7);

        let pop: Population<Candidate> = Population::random(100, 0.071, &layout(), &mut rng);
        assert_eq!(pop.elite_count(), 8);

        let pop: Population<Candidate> = Population::random(30, 0.1, &layout(), &mut rng);
        assert_eq!(pop.elite_count(), 3);
    }

    #[test]
    fn test_elite_mean_without_elites_uses_fittest() {
        let pop = create_test_population(0.0);
        assert_eq!(pop.elite_count(), 0);
        assert_eq!(pop.elite_mean_fitness(), Some(0.9));
    }

    #[test]
    #[should_panic(expected = "Elitism rate must be in [0, 1]")]
    fn test_invalid_elitism_rate() {
        let _: Population<Candidate> = Population::new(4, 1.5);
    }
}
