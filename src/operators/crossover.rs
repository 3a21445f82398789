//! Crossover operators
//!
//! This module provides the chord-aware crossover, a per-gene uniform
//! crossover, and the blend of the two used by the search loop.

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::error::{OperatorError, OperatorResult};
use crate::genome::candidate::Candidate;
use crate::operators::traits::CrossoverOperator;

fn check_parents(parent1: &Candidate, parent2: &Candidate) -> Result<(), OperatorError> {
    if parent1.is_compatible(parent2) {
        Ok(())
    } else {
        Err(OperatorError::IllegalArgument(format!(
            "parents differ in shape: {}x{} vs {}x{}",
            parent1.voicing(),
            parent1.chord_count(),
            parent2.voicing(),
            parent2.chord_count()
        )))
    }
}

/// Single-locus crossover on chord boundaries
///
/// Children take whole chords: slots before the locus from one parent and
/// the remaining slots from the other. The locus is drawn from
/// `[1, chord_count - 1]` so both parents always contribute.
#[derive(Clone, Debug, Default)]
pub struct ChordCrossover;

impl ChordCrossover {
    /// Create a new chord crossover
    pub fn new() -> Self {
        Self
    }

    /// Cross the parents at a fixed chord locus
    pub fn crossover_at(
        &self,
        parent1: &Candidate,
        parent2: &Candidate,
        locus: usize,
    ) -> OperatorResult<(Candidate, Candidate)> {
        if let Err(e) = check_parents(parent1, parent2) {
            return OperatorResult::Failed(e);
        }
        let chords = parent1.chord_count();
        if locus == 0 || locus >= chords {
            return OperatorResult::Failed(OperatorError::CrossoverFailed(format!(
                "locus {} outside [1, {}]",
                locus,
                chords.saturating_sub(1)
            )));
        }

        let cut = locus * parent1.voice_count();
        let (head1, tail1) = parent1.pitches().split_at(cut);
        let (head2, tail2) = parent2.pitches().split_at(cut);
        let voicing = parent1.voicing();

        let child1 = Candidate::from_valid_genes(Arc::clone(voicing), [head1, tail2].concat());
        let child2 = Candidate::from_valid_genes(Arc::clone(voicing), [head2, tail1].concat());

        OperatorResult::Success((child1, child2))
    }
}

impl CrossoverOperator<Candidate> for ChordCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Candidate,
        parent2: &Candidate,
        rng: &mut R,
    ) -> OperatorResult<(Candidate, Candidate)> {
        let chords = parent1.chord_count();
        if chords < 2 {
            return OperatorResult::Failed(OperatorError::CrossoverFailed(
                "a single chord has no interior locus".to_string(),
            ));
        }
        let locus = rng.gen_range(1..chords);
        self.crossover_at(parent1, parent2, locus)
    }
}

/// Uniform crossover over individual genes
///
/// Each gene position is swapped between the children with probability
/// `ratio`.
#[derive(Clone, Debug)]
pub struct UniformCrossover {
    /// Per-gene swap probability
    pub ratio: f64,
}

impl UniformCrossover {
    /// Create a new uniform crossover
    pub fn new(ratio: f64) -> Self {
        assert!((0.0..=1.0).contains(&ratio), "Ratio must be in [0, 1]");
        Self { ratio }
    }
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl CrossoverOperator<Candidate> for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Candidate,
        parent2: &Candidate,
        rng: &mut R,
    ) -> OperatorResult<(Candidate, Candidate)> {
        if let Err(e) = check_parents(parent1, parent2) {
            return OperatorResult::Failed(e);
        }
        let swap = match Bernoulli::new(self.ratio) {
            Ok(d) => d,
            Err(e) => {
                return OperatorResult::Failed(OperatorError::InvalidConfiguration(e.to_string()))
            }
        };

        let n = parent1.len();
        let mut child1 = Vec::with_capacity(n);
        let mut child2 = Vec::with_capacity(n);
        for (&a, &b) in parent1.pitches().iter().zip(parent2.pitches()) {
            if swap.sample(rng) {
                child1.push(b);
                child2.push(a);
            } else {
                child1.push(a);
                child2.push(b);
            }
        }

        let voicing = parent1.voicing();
        OperatorResult::Success((
            Candidate::from_valid_genes(Arc::clone(voicing), child1),
            Candidate::from_valid_genes(Arc::clone(voicing), child2),
        ))
    }
}

/// Chord crossover blended with uniform crossover
///
/// With probability `by_chord_ratio` the chord crossover is applied,
/// otherwise the uniform one.
#[derive(Clone, Debug)]
pub struct BlendedCrossover {
    /// Chance of choosing the chord crossover
    pub by_chord_ratio: f64,
    chordal: ChordCrossover,
    uniform: UniformCrossover,
}

impl BlendedCrossover {
    /// Create a blend with the given chord-crossover chance and per-gene
    /// uniform swap ratio
    pub fn new(by_chord_ratio: f64, uniform_ratio: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&by_chord_ratio),
            "By-chord ratio must be in [0, 1]"
        );
        Self {
            by_chord_ratio,
            chordal: ChordCrossover::new(),
            uniform: UniformCrossover::new(uniform_ratio),
        }
    }

    /// Chord crossover only
    pub fn chordal_only() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Default for BlendedCrossover {
    fn default() -> Self {
        Self::new(0.8, 0.3)
    }
}

impl CrossoverOperator<Candidate> for BlendedCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Candidate,
        parent2: &Candidate,
        rng: &mut R,
    ) -> OperatorResult<(Candidate, Candidate)> {
        if rng.gen::<f64>() < self.by_chord_ratio {
            self.chordal.crossover(parent1, parent2, rng)
        } else {
            self.uniform.crossover(parent1, parent2, rng)
        }
    }
}
