//! Voice-leading genetic algorithm
//!
//! A generational elitist GA over chord progressions: the top fraction of
//! each generation survives unchanged, the rest is bred from tournament
//! winners by chord crossover and chord mutation.

use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagnostics::{EvolutionResult, EvolutionStats, GenerationStats, ProgressLog, TimingStats};
use crate::error::{EvoResult, EvolutionError, OperatorResult};
use crate::fitness::rule_set::RuleSet;
use crate::fitness::rules::Rule;
use crate::genome::candidate::{Candidate, ChordLayout};
use crate::operators::crossover::BlendedCrossover;
use crate::operators::mutation::ChordMutation;
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{CrossoverOperator, MutationOperator, SelectionOperator};
use crate::pitch::Voicing;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::termination::{AnyOf, Cancelled, ChordalTarget, EvolutionState, MaxGenerations};

/// Configuration for the voice-leading GA
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceLeadingConfig {
    /// Voice labels, top to bottom, e.g. `SATB`
    pub voicing: String,
    /// Number of chords in a candidate
    pub chord_count: usize,
    /// Population capacity
    pub population_size: usize,
    /// Fraction of each generation carried over unchanged
    pub elitism_rate: f64,
    /// Chance of crossover without mutation
    pub crossover_only_rate: f64,
    /// Chance of crossover followed by mutation of both children
    pub crossover_mutation_rate: f64,
    /// Chance of mutation without crossover
    pub mutation_only_rate: f64,
    /// Maximum number of mutated chord slots
    pub max_mutation_loci: usize,
    /// Maximum number of mutated voices per slot
    pub max_mutated_voices: usize,
    /// Chance of chord crossover over uniform crossover
    pub by_chord_ratio: f64,
    /// Per-gene swap chance of the uniform crossover
    pub uniform_ratio: f64,
    /// Whether mutation may redraw the current pitch
    pub can_keep: bool,
    /// Active rules, in evaluation order
    pub rules: Vec<Rule>,
    /// Fitness at which the search stops (if the fittest has no non-chord)
    pub fitness_target: f64,
    /// Generation cap
    pub max_generations: usize,
    /// Tournament size for parent selection
    pub tournament_size: usize,
    /// Seed for [`VoiceLeadingGA::run_seeded`]
    pub seed: Option<u64>,
    /// Minimum seconds between progress snapshots
    pub log_interval_secs: f64,
    /// Snapshots are only taken on generations divisible by this
    pub log_every: usize,
    /// Whether to evaluate in parallel
    pub parallel_evaluation: bool,
}

impl Default for VoiceLeadingConfig {
    fn default() -> Self {
        Self {
            voicing: "SAATTB".to_string(),
            chord_count: 17,
            population_size: 1200,
            elitism_rate: 0.25,
            crossover_only_rate: 0.10,
            crossover_mutation_rate: 0.75,
            mutation_only_rate: 0.10,
            max_mutation_loci: 3,
            max_mutated_voices: 6,
            by_chord_ratio: 0.8,
            uniform_ratio: 0.3,
            can_keep: true,
            rules: Rule::ALL.to_vec(),
            fitness_target: 0.98,
            max_generations: 1200,
            tournament_size: 2,
            seed: None,
            log_interval_secs: 3.0,
            log_every: 10,
            parallel_evaluation: true,
        }
    }
}

fn check_unit(name: &str, value: f64) -> EvoResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionError::Configuration(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}

fn check_positive(name: &str, value: usize) -> EvoResult<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(EvolutionError::Configuration(format!(
            "{} must be at least 1",
            name
        )))
    }
}

impl VoiceLeadingConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> EvoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn to_json_string(&self) -> EvoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the voice labels
    pub fn parse_voicing(&self) -> EvoResult<Voicing> {
        Voicing::from_str(&self.voicing).map_err(|e| {
            EvolutionError::Configuration(format!("voicing {:?}: {}", self.voicing, e))
        })
    }

    /// Check every parameter
    pub fn validate(&self) -> EvoResult<()> {
        self.parse_voicing()?;
        check_positive("chord_count", self.chord_count)?;
        check_positive("population_size", self.population_size)?;
        check_positive("max_mutation_loci", self.max_mutation_loci)?;
        check_positive("max_mutated_voices", self.max_mutated_voices)?;
        check_positive("tournament_size", self.tournament_size)?;
        check_positive("log_every", self.log_every)?;
        check_unit("elitism_rate", self.elitism_rate)?;
        check_unit("crossover_only_rate", self.crossover_only_rate)?;
        check_unit("crossover_mutation_rate", self.crossover_mutation_rate)?;
        check_unit("mutation_only_rate", self.mutation_only_rate)?;
        check_unit("by_chord_ratio", self.by_chord_ratio)?;
        check_unit("uniform_ratio", self.uniform_ratio)?;
        self.log_interval()?;
        if self.fitness_target.is_nan() {
            return Err(EvolutionError::Configuration(
                "fitness_target must be a number".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum time between progress snapshots
    pub fn log_interval(&self) -> EvoResult<Duration> {
        Duration::try_from_secs_f64(self.log_interval_secs).map_err(|e| {
            EvolutionError::Configuration(format!(
                "log_interval_secs {}: {}",
                self.log_interval_secs, e
            ))
        })
    }

    /// Parameter lines written at the start of a run
    pub fn describe(&self, rules: &RuleSet) -> Vec<String> {
        let mut lines = vec![
            format!("Voice = {}", self.voicing),
            format!("Chord No. = {}", self.chord_count),
            format!("Population = {}", self.population_size),
            format!("Elitism Rate = {}", self.elitism_rate),
            format!("Crossover Only Rate = {}", self.crossover_only_rate),
            format!("Crossover + Mutation Rate = {}", self.crossover_mutation_rate),
            format!("Mutation Only Rate = {}", self.mutation_only_rate),
            format!("Fitness Aim = {}", self.fitness_target),
            format!("Generation Limit = {}", self.max_generations),
            format!("Max Mutation Loci = {}", self.max_mutation_loci),
            format!("Max Mutated Voices = {}", self.max_mutated_voices),
            "Evaluation:".to_string(),
        ];
        lines.extend(rules.rules().map(|rule| format!(" - {}", rule)));
        lines
    }
}

/// How a pair of parents is varied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variation {
    /// Crossover, then mutate both children
    CrossoverMutation,
    /// Crossover only
    CrossoverOnly,
    /// Mutate both parents
    MutationOnly,
    /// Copy the parents
    Unchanged,
}

/// Builder for VoiceLeadingGA
#[derive(Default)]
pub struct VoiceLeadingGABuilder {
    config: VoiceLeadingConfig,
    rule_set: Option<RuleSet>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl VoiceLeadingGABuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: VoiceLeadingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the voice labels
    pub fn voicing(mut self, voicing: &str) -> Self {
        self.config.voicing = voicing.to_string();
        self
    }

    /// Set the number of chords
    pub fn chord_count(mut self, count: usize) -> Self {
        self.config.chord_count = count;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the elitism rate
    pub fn elitism_rate(mut self, rate: f64) -> Self {
        self.config.elitism_rate = rate;
        self
    }

    /// Set the crossover + mutation, crossover-only and mutation-only rates
    pub fn variation_rates(
        mut self,
        crossover_mutation: f64,
        crossover_only: f64,
        mutation_only: f64,
    ) -> Self {
        self.config.crossover_mutation_rate = crossover_mutation;
        self.config.crossover_only_rate = crossover_only;
        self.config.mutation_only_rate = mutation_only;
        self
    }

    /// Set the mutation limits
    pub fn mutation_limits(mut self, max_loci: usize, max_voices: usize) -> Self {
        self.config.max_mutation_loci = max_loci;
        self.config.max_mutated_voices = max_voices;
        self
    }

    /// Set the active rules with default weights
    pub fn rules(mut self, rules: &[Rule]) -> Self {
        self.config.rules = rules.to_vec();
        self.rule_set = None;
        self
    }

    /// Use a rule set with custom weights
    pub fn rule_set(mut self, rule_set: RuleSet) -> Self {
        self.config.rules = rule_set.rules().collect();
        self.rule_set = Some(rule_set);
        self
    }

    /// Set the fitness target
    pub fn fitness_target(mut self, target: f64) -> Self {
        self.config.fitness_target = target;
        self
    }

    /// Set the generation cap
    pub fn max_generations(mut self, max: usize) -> Self {
        self.config.max_generations = max;
        self
    }

    /// Set the seed used by `run_seeded`
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the progress snapshot gating
    pub fn progress(mut self, interval: Duration, every: usize) -> Self {
        self.config.log_interval_secs = interval.as_secs_f64();
        self.config.log_every = every;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Stop the run when this flag is raised
    pub fn cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Build the VoiceLeadingGA instance
    pub fn build(self) -> EvoResult<VoiceLeadingGA> {
        self.config.validate()?;
        let voicing = self.config.parse_voicing()?;
        let config = self.config;

        let rule_set = self
            .rule_set
            .unwrap_or_else(|| RuleSet::new(&config.rules));
        let cancelled = Cancelled::new(self.cancellation.unwrap_or_default());
        let termination: AnyOf<Candidate> = AnyOf::new(vec![
            Box::new(ChordalTarget::new(config.fitness_target)),
            Box::new(MaxGenerations::new(config.max_generations)),
            Box::new(cancelled.clone()),
        ]);

        Ok(VoiceLeadingGA {
            layout: ChordLayout::new(voicing, config.chord_count),
            selection: TournamentSelection::new(config.tournament_size),
            crossover: BlendedCrossover::new(config.by_chord_ratio, config.uniform_ratio),
            mutation: ChordMutation::new(config.max_mutation_loci, config.max_mutated_voices)
                .with_can_keep(config.can_keep),
            rule_set,
            cancelled,
            termination,
            config,
        })
    }
}

/// Voice-leading genetic algorithm
pub struct VoiceLeadingGA {
    config: VoiceLeadingConfig,
    layout: ChordLayout,
    rule_set: RuleSet,
    selection: TournamentSelection,
    crossover: BlendedCrossover,
    mutation: ChordMutation,
    cancelled: Cancelled,
    termination: AnyOf<Candidate>,
}

impl VoiceLeadingGA {
    /// Create a builder for VoiceLeadingGA
    pub fn builder() -> VoiceLeadingGABuilder {
        VoiceLeadingGABuilder::new()
    }

    /// The validated configuration
    pub fn config(&self) -> &VoiceLeadingConfig {
        &self.config
    }

    /// The fitness landscape
    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Shape of the candidates
    pub fn layout(&self) -> &ChordLayout {
        &self.layout
    }

    /// Flag that stops the run at the next generation boundary
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled.0)
    }

    /// Which variation a uniform draw in `[0, 1)` falls into
    pub fn variation_for(&self, dice: f64) -> Variation {
        let mut dice = dice - self.config.crossover_mutation_rate;
        if dice < 0.0 {
            return Variation::CrossoverMutation;
        }
        dice -= self.config.crossover_only_rate;
        if dice < 0.0 {
            return Variation::CrossoverOnly;
        }
        dice -= self.config.mutation_only_rate;
        if dice < 0.0 {
            return Variation::MutationOnly;
        }
        Variation::Unchanged
    }

    /// A random, evaluated first generation
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Population<Candidate> {
        let mut population = Population::random(
            self.config.population_size,
            self.config.elitism_rate,
            &self.layout,
            rng,
        );
        self.evaluate(&mut population);
        population
    }

    /// Evaluate the unevaluated individuals, returning how many were evaluated
    pub fn evaluate(&self, population: &mut Population<Candidate>) -> usize {
        if self.config.parallel_evaluation {
            population.evaluate_parallel(&self.rule_set)
        } else {
            population.evaluate(&self.rule_set)
        }
    }

    /// Breed the next generation from an evaluated one
    ///
    /// Elites keep their fitness; offspring are left unevaluated.
    pub fn next_generation<R: Rng>(
        &self,
        current: &Population<Candidate>,
        rng: &mut R,
    ) -> Population<Candidate> {
        self.breed(current, rng).0
    }

    fn breed<R: Rng>(
        &self,
        current: &Population<Candidate>,
        rng: &mut R,
    ) -> (Population<Candidate>, TimingStats) {
        let mut next = current.next_generation();
        let pool = current.as_fitness_pairs();
        let birth = next.generation();
        let mut selection_time = Duration::ZERO;
        let mut variation_time = Duration::ZERO;

        while !next.is_full() && !pool.is_empty() {
            let sel_start = Instant::now();
            let parent1 = &pool[self.selection.select(&pool, rng)].0;
            let parent2 = &pool[self.selection.select(&pool, rng)].0;
            selection_time += sel_start.elapsed();

            let var_start = Instant::now();
            let (child1, child2) = match self.variation_for(rng.gen::<f64>()) {
                Variation::CrossoverMutation => {
                    let (c1, c2) = self.cross(parent1, parent2, rng);
                    (self.mutate(&c1, rng), self.mutate(&c2, rng))
                }
                Variation::CrossoverOnly => self.cross(parent1, parent2, rng),
                Variation::MutationOnly => (self.mutate(parent1, rng), self.mutate(parent2, rng)),
                Variation::Unchanged => (parent1.clone(), parent2.clone()),
            };
            variation_time += var_start.elapsed();

            next.push(Individual::with_generation(child1, birth));
            next.push(Individual::with_generation(child2, birth));
        }

        let timing = TimingStats::new()
            .with_selection(selection_time)
            .with_variation(variation_time);
        (next, timing)
    }

    fn cross<R: Rng>(
        &self,
        parent1: &Candidate,
        parent2: &Candidate,
        rng: &mut R,
    ) -> (Candidate, Candidate) {
        match self.crossover.crossover(parent1, parent2, rng) {
            OperatorResult::Success(pair) | OperatorResult::Repaired(pair, _) => pair,
            OperatorResult::Failed(e) => {
                debug!("crossover skipped: {}", e);
                (parent1.clone(), parent2.clone())
            }
        }
    }

    fn mutate<R: Rng>(&self, genome: &Candidate, rng: &mut R) -> Candidate {
        match self.mutation.mutate(genome, rng) {
            OperatorResult::Success(child) => child,
            OperatorResult::Repaired(child, info) => {
                debug!(
                    "mutation repaired by {}: {}",
                    info.repair_method,
                    info.constraint_violations.join("; ")
                );
                child
            }
            OperatorResult::Failed(e) => {
                debug!("mutation skipped: {}", e);
                genome.clone()
            }
        }
    }

    /// Run the search with the configured seed, or an entropy seed if none
    pub fn run_seeded(&self) -> EvoResult<EvolutionResult<Candidate>> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(&mut rng)
    }

    /// Run the genetic algorithm
    pub fn run<R: Rng>(&self, rng: &mut R) -> EvoResult<EvolutionResult<Candidate>> {
        let start_time = Instant::now();
        let mut log = ProgressLog::new(self.config.log_interval()?, self.config.log_every);
        for line in self.config.describe(&self.rule_set) {
            log.log(line);
        }
        log.log("\nEvolution begins...");

        let eval_start = Instant::now();
        let mut population = self.initial_population(rng);
        let mut evaluations = population.len();

        let mut stats = EvolutionStats::new();
        let gen_stats = GenerationStats::from_population(&population, 0, evaluations)
            .with_timing(TimingStats::new().with_evaluation(eval_start.elapsed()));
        stats.record(gen_stats);

        loop {
            let best = population.best().ok_or(EvolutionError::EmptyPopulation)?;
            let state = EvolutionState {
                generation: population.generation(),
                best,
            };
            if let Some(criterion) = self.termination.first_triggered(&state) {
                stats.set_termination_reason(criterion.reason());
                break;
            }

            let gen_start = Instant::now();
            let (mut next, timing) = self.breed(&population, rng);

            let eval_start = Instant::now();
            evaluations += self.evaluate(&mut next);
            let eval_time = eval_start.elapsed();
            population = next;

            let gen_stats =
                GenerationStats::from_population(&population, population.generation(), evaluations)
                    .with_timing(
                        timing
                            .with_evaluation(eval_time)
                            .with_total(gen_start.elapsed()),
                    );
            let elite_mean = gen_stats.elite_mean_fitness;
            stats.record(gen_stats);

            if let Some(best) = population.best() {
                log.snapshot(population.generation(), &best.genome, best.fitness_f64(), elite_mean);
            }
        }

        stats.set_runtime(start_time.elapsed());
        let best = population
            .best()
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();
        let best_fitness = best.fitness_f64();
        let generations = population.generation();

        log.log(format!("Fittest = \n{}", best.genome));
        log.log(format!("fitness = {:.6}", best_fitness));
        log.log(format!("generation = {}", generations));
        info!("{}", stats.summary());

        Ok(EvolutionResult::new(best.genome, best_fitness, generations, evaluations)
            .with_stats(stats)
            .with_log(log.into_lines()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn small_builder() -> VoiceLeadingGABuilder {
        VoiceLeadingGA::builder()
            .voicing("SATB")
            .chord_count(4)
            .population_size(40)
            .elitism_rate(0.2)
            .max_generations(15)
            .progress(Duration::ZERO, 5)
    }

    #[test]
    fn test_default_config() {
        let config = VoiceLeadingConfig::default();
        assert_eq!(config.voicing, "SAATTB");
        assert_eq!(config.chord_count, 17);
        assert_eq!(config.population_size, 1200);
        assert_eq!(config.rules, Rule::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = VoiceLeadingConfig {
            seed: Some(9),
            rules: vec![Rule::ImproperOuterVoices, Rule::ImproperCadentialForm],
            ..VoiceLeadingConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(VoiceLeadingConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_config_json_partial() {
        let config =
            VoiceLeadingConfig::from_json_str(r#"{"voicing": "SATB", "chord_count": 8}"#).unwrap();
        assert_eq!(config.voicing, "SATB");
        assert_eq!(config.chord_count, 8);
        assert_eq!(config.population_size, 1200);

        assert!(matches!(
            VoiceLeadingConfig::from_json_str("{"),
            Err(EvolutionError::Serialization(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let bad_voice = VoiceLeadingConfig {
            voicing: "SAXB".to_string(),
            ..VoiceLeadingConfig::default()
        };
        assert!(matches!(
            bad_voice.validate(),
            Err(EvolutionError::Configuration(_))
        ));

        let bad_rate = VoiceLeadingConfig {
            elitism_rate: 1.5,
            ..VoiceLeadingConfig::default()
        };
        assert!(bad_rate.validate().is_err());

        let no_chords = VoiceLeadingConfig {
            chord_count: 0,
            ..VoiceLeadingConfig::default()
        };
        assert!(no_chords.validate().is_err());

        assert!(VoiceLeadingGA::builder().population_size(0).build().is_err());
    }

    #[test]
    fn test_log_interval_must_fit_a_duration() {
        for secs in [1e30, -1.0, f64::INFINITY, f64::NAN] {
            let config = VoiceLeadingConfig {
                log_interval_secs: secs,
                ..VoiceLeadingConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(EvolutionError::Configuration(_))
            ));
            assert!(VoiceLeadingGA::builder().config(config).build().is_err());
        }

        let config = VoiceLeadingConfig {
            log_interval_secs: 0.5,
            ..VoiceLeadingConfig::default()
        };
        assert_eq!(config.log_interval().unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_variation_bands() {
        let ga = small_builder().variation_rates(0.5, 0.2, 0.1).build().unwrap();
        assert_eq!(ga.variation_for(0.0), Variation::CrossoverMutation);
        assert_eq!(ga.variation_for(0.49), Variation::CrossoverMutation);
        assert_eq!(ga.variation_for(0.55), Variation::CrossoverOnly);
        assert_eq!(ga.variation_for(0.75), Variation::MutationOnly);
        assert_eq!(ga.variation_for(0.9), Variation::Unchanged);
    }

    #[test]
    fn test_describe_parameters() {
        let ga = small_builder()
            .rules(&[Rule::VoiceIndependence, Rule::StartWithNonTriad])
            .build()
            .unwrap();
        let lines = ga.config().describe(ga.rule_set());
        assert_eq!(lines[0], "Voice = SATB");
        assert_eq!(lines[1], "Chord No. = 4");
        assert_eq!(lines[11], "Evaluation:");
        assert_eq!(&lines[12..], [" - VoiceIndependence", " - StartWithNonTriad"]);
    }

    #[test]
    fn test_next_generation_keeps_elites() {
        let mut rng = StdRng::seed_from_u64(1);
        let ga = small_builder().build().unwrap();
        let current = ga.initial_population(&mut rng);
        let next = ga.next_generation(&current, &mut rng);

        assert_eq!(next.len(), 40);
        assert_eq!(next.generation(), 1);
        let elites = current.elites();
        assert_eq!(elites.len(), 8);
        for (kept, elite) in next.iter().zip(elites) {
            assert_eq!(kept.genome, elite.genome);
            assert_eq!(kept.fitness, elite.fitness);
        }
        assert!(next.iter().skip(8).all(|i| !i.is_evaluated()));
    }

    #[test]
    fn test_run_reaches_cap_or_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let ga = small_builder().build().unwrap();
        let result = ga.run(&mut rng).unwrap();

        assert!(result.generations <= 15);
        assert!(result.best_fitness >= 0.98 || result.generations == 15);
        if result.termination_reason() == Some("Target fitness reached") {
            assert!(!result.best_genome.has_non_chord());
        }
        assert_eq!(result.stats.num_generations(), result.generations + 1);
        assert_eq!(result.best_fitness, ga.rule_set().fitness(&result.best_genome));
    }

    #[test]
    fn test_run_log_layout() {
        let mut rng = StdRng::seed_from_u64(3);
        let ga = small_builder().max_generations(10).fitness_target(2.0).build().unwrap();
        let result = ga.run(&mut rng).unwrap();

        assert_eq!(result.log[0], "Voice = SATB");
        assert!(result.log.contains(&"\nEvolution begins...".to_string()));
        // generations 5 and 10 are snapshotted
        let snapshots: Vec<&String> = result.log.iter().filter(|l| l.contains(" P[")).collect();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].starts_with("     5:"));

        let n = result.log.len();
        assert!(result.log[n - 3].starts_with("Fittest = \n[ S,  A,  T,  B]"));
        assert!(result.log[n - 2].starts_with("fitness = "));
        assert_eq!(result.log[n - 1], "generation = 10");
        assert_eq!(result.termination_reason(), Some("Maximum generations reached"));
    }

    #[test]
    fn test_snapshot_without_elites_reports_fittest() {
        let mut rng = StdRng::seed_from_u64(8);
        let ga = small_builder()
            .elitism_rate(0.0)
            .max_generations(3)
            .fitness_target(2.0)
            .progress(Duration::ZERO, 1)
            .build()
            .unwrap();
        let result = ga.run(&mut rng).unwrap();

        let snapshots: Vec<&String> = result.log.iter().filter(|l| l.contains(" P[")).collect();
        assert_eq!(snapshots.len(), 3);
        for line in snapshots {
            let (_, rest) = line.split_once(':').unwrap();
            let (best, rest) = rest.split_once(" /").unwrap();
            let elite = rest.split_whitespace().next().unwrap();
            assert_eq!(best.trim(), elite, "{}", line);
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut rng = StdRng::seed_from_u64(4);
        let flag = Arc::new(AtomicBool::new(false));
        let ga = small_builder()
            .fitness_target(2.0)
            .cancellation(Arc::clone(&flag))
            .build()
            .unwrap();
        ga.cancellation_handle().store(true, Ordering::Relaxed);
        assert!(flag.load(Ordering::Relaxed));

        let result = ga.run(&mut rng).unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.evaluations, 40);
        assert_eq!(result.termination_reason(), Some("Cancelled"));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let ga = small_builder().seed(11).max_generations(5).build().unwrap();
        let a = ga.run_seeded().unwrap();
        let b = ga.run_seeded().unwrap();
        assert_eq!(a.best_genome, b.best_genome);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.evaluations, b.evaluations);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel = small_builder().max_generations(4).build().unwrap();
        let sequential = small_builder()
            .max_generations(4)
            .parallel_evaluation(false)
            .build()
            .unwrap();
        let a = parallel.run(&mut StdRng::seed_from_u64(5)).unwrap();
        let b = sequential.run(&mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.best_genome, b.best_genome);
    }

    #[test]
    fn test_custom_rule_set() {
        let mut rng = StdRng::seed_from_u64(6);
        let rules = RuleSet::new(&[Rule::ImproperOuterVoices]).with_weight(Rule::ImproperOuterVoices, 0.5);
        let ga = small_builder().rule_set(rules.clone()).build().unwrap();
        assert_eq!(ga.rule_set(), &rules);
        assert_eq!(ga.config().rules, vec![Rule::ImproperOuterVoices]);

        let population = ga.initial_population(&mut rng);
        for individual in population.iter() {
            assert_eq!(individual.fitness_f64(), rules.fitness(&individual.genome));
        }
    }
}
