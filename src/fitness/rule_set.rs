//! Weighted rule set
//!
//! The fitness landscape: `1 − Σ weight × defects` over the active rules.
//! Fitness is not clamped and goes negative for badly broken candidates.

use serde::{Deserialize, Serialize};

use crate::fitness::rules::Rule;
use crate::fitness::traits::Fitness;
use crate::genome::candidate::Candidate;

/// A rule paired with its penalty per defect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedRule {
    pub rule: Rule,
    pub weight: f64,
}

impl From<Rule> for WeightedRule {
    fn from(rule: Rule) -> Self {
        Self {
            rule,
            weight: rule.default_weight(),
        }
    }
}

/// Defects found by one rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub rule: Rule,
    pub defects: usize,
    pub weight: f64,
}

impl Penalty {
    /// Contribution to the penalty sum
    pub fn value(&self) -> f64 {
        self.weight * self.defects as f64
    }
}

/// Ordered list of active rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<WeightedRule>,
}

impl RuleSet {
    /// Rule set with default weights, in the given order
    pub fn new(rules: &[Rule]) -> Self {
        Self {
            rules: rules.iter().copied().map(WeightedRule::from).collect(),
        }
    }

    /// Every rule with its default weight
    pub fn all() -> Self {
        Self::new(&Rule::ALL)
    }

    /// Override the weight of an active rule
    pub fn with_weight(mut self, rule: Rule, weight: f64) -> Self {
        for entry in self.rules.iter_mut().filter(|e| e.rule == rule) {
            entry.weight = weight;
        }
        self
    }

    /// Active rules in order
    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.rules.iter().map(|e| e.rule)
    }

    /// Weight of a rule, if active
    pub fn weight(&self, rule: Rule) -> Option<f64> {
        self.rules.iter().find(|e| e.rule == rule).map(|e| e.weight)
    }

    /// Number of active rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is active
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Per-rule defect counts
    pub fn penalties(&self, candidate: &Candidate) -> Vec<Penalty> {
        self.rules
            .iter()
            .map(|e| Penalty {
                rule: e.rule,
                defects: e.rule.defects(candidate),
                weight: e.weight,
            })
            .collect()
    }

    /// `1 − Σ weight × defects`, summing only rules with defects
    pub fn fitness(&self, candidate: &Candidate) -> f64 {
        1.0 - self
            .penalties(candidate)
            .iter()
            .filter(|p| p.defects > 0)
            .map(Penalty::value)
            .sum::<f64>()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl Fitness for RuleSet {
    type Genome = Candidate;
    type Value = f64;

    fn evaluate(&self, genome: &Candidate) -> f64 {
        self.fitness(genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{Pitch::*, Voicing};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn authentic() -> Candidate {
        Candidate::from_chords(
            Arc::new(Voicing::satb()),
            &[&[E5, G4, C4, C3], &[D5, G4, B3, G2], &[C5, G4, E4, C3]],
        )
        .unwrap()
    }

    #[test]
    fn test_clean_cadence_scores() {
        let c = authentic();
        let penalties = RuleSet::all().penalties(&c);
        let fitness = RuleSet::all().evaluate(&c);
        let expected = 1.0 - penalties.iter().map(Penalty::value).sum::<f64>();
        assert!((fitness - expected).abs() < 1e-12);
        assert!(fitness <= 1.0);
        assert_eq!(c.series(), "[TTT]");
        assert_eq!(c.progression(), "[CGC]");
    }

    #[test]
    fn test_empty_rule_set_is_perfect() {
        let c = authentic();
        assert_eq!(RuleSet::new(&[]).evaluate(&c), 1.0);
    }

    #[test]
    fn test_weight_override() {
        let rules = RuleSet::new(&[Rule::StartWithNonTriad]).with_weight(Rule::StartWithNonTriad, 0.5);
        assert_eq!(rules.weight(Rule::StartWithNonTriad), Some(0.5));
        assert_eq!(rules.weight(Rule::VoiceIndependence), None);
        let c = Candidate::from_chords(Arc::new(Voicing::satb()), &[&[E5, C5, D4, C3]]).unwrap();
        assert_eq!(rules.evaluate(&c), 0.5);
    }

    #[test]
    fn test_fitness_is_not_clamped() {
        let c = Candidate::from_chords(
            Arc::new(Voicing::satb()),
            &[&[G4, C5, F4, E2], &[G4, C5, C3, C4], &[G4, C5, F4, E2]],
        )
        .unwrap();
        assert!(RuleSet::all().evaluate(&c) < 0.0);
    }

    #[test]
    fn test_fitness_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let rules = RuleSet::all();
        for _ in 0..20 {
            let c = Candidate::random(&mut rng, Arc::new(Voicing::satb()), 6);
            assert_eq!(rules.evaluate(&c), rules.evaluate(&c));
        }
    }
}
