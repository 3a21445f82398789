//! Mutation operators
//!
//! This module provides the chord-aware mutation: a few chord slots are
//! picked and, in each, a few voices are re-drawn from their registers,
//! restricted to pitches that keep the local melodic figure singable.

use std::sync::Arc;

use rand::seq::index;
use rand::Rng;

use crate::error::{OperatorError, OperatorResult, RepairInfo};
use crate::fitness::rules::is_melodic_feasible;
use crate::genome::candidate::Candidate;
use crate::operators::traits::MutationOperator;
use crate::pitch::Pitch;

/// One chord slot and the voices to re-draw in it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationSite {
    /// Chord slot index
    pub slot: usize,
    /// Voice indices, ascending
    pub voices: Vec<usize>,
}

/// Chord-aware mutation
///
/// Draws `1..=max_loci` distinct slots and, for all of them, the same number
/// `1..=max_voices` of voices (a fresh subset per slot). Both counts are
/// clamped to the candidate's shape.
#[derive(Clone, Debug)]
pub struct ChordMutation {
    /// Maximum number of mutated slots
    pub max_loci: usize,
    /// Maximum number of mutated voices per slot
    pub max_voices: usize,
    /// Whether the current pitch may be drawn again
    pub can_keep: bool,
}

impl ChordMutation {
    /// Create a new chord mutation
    pub fn new(max_loci: usize, max_voices: usize) -> Self {
        assert!(max_loci >= 1, "Max loci must be at least 1");
        assert!(max_voices >= 1, "Max voices must be at least 1");
        Self {
            max_loci,
            max_voices,
            can_keep: true,
        }
    }

    /// Set whether the current pitch may be kept
    pub fn with_can_keep(mut self, can_keep: bool) -> Self {
        self.can_keep = can_keep;
        self
    }

    /// Draw the slots and voices to mutate
    pub fn draw_sites<R: Rng>(&self, genome: &Candidate, rng: &mut R) -> Vec<MutationSite> {
        let chords = genome.chord_count();
        let voices = genome.voice_count();
        let m_voices = rng.gen_range(1..=self.max_voices).min(voices);
        let m_loci = rng.gen_range(1..=self.max_loci).min(chords);

        index::sample(rng, chords, m_loci)
            .into_iter()
            .map(|slot| {
                let mut picked = index::sample(rng, voices, m_voices).into_vec();
                picked.sort_unstable();
                MutationSite {
                    slot,
                    voices: picked,
                }
            })
            .collect()
    }

    /// Register pitches for `voice` at `slot` that keep the melodic figure
    /// feasible against the neighbouring slot of the source genome
    pub fn feasible_pitches(&self, genome: &Candidate, slot: usize, voice: usize) -> Vec<Pitch> {
        let role = genome.voice(voice);
        let last = genome.chord_count() - 1;
        let current = genome.gene(slot, voice);
        role.register()
            .pitches()
            .filter(|&p| self.can_keep || p != current)
            .filter(|&p| {
                if last == 0 {
                    true
                } else if slot == last {
                    is_melodic_feasible(role, &[genome.gene(slot - 1, voice), p])
                } else {
                    is_melodic_feasible(role, &[p, genome.gene(slot + 1, voice)])
                }
            })
            .collect()
    }

    /// Mutate exactly the given sites
    pub fn mutate_sites<R: Rng>(
        &self,
        genome: &Candidate,
        sites: &[MutationSite],
        rng: &mut R,
    ) -> OperatorResult<Candidate> {
        let chords = genome.chord_count();
        let voices = genome.voice_count();
        let mut genes = genome.pitches().to_vec();
        let mut violations = Vec::new();

        for site in sites {
            if site.slot >= chords {
                return OperatorResult::Failed(OperatorError::IllegalArgument(format!(
                    "slot {} outside {} chords",
                    site.slot, chords
                )));
            }
            for &v in &site.voices {
                if v >= voices {
                    return OperatorResult::Failed(OperatorError::IllegalArgument(format!(
                        "voice {} outside {} voices",
                        v, voices
                    )));
                }
                let mut pool = self.feasible_pitches(genome, site.slot, v);
                if pool.is_empty() {
                    let current = genome.gene(site.slot, v);
                    pool = genome
                        .voice(v)
                        .register()
                        .pitches()
                        .filter(|&p| self.can_keep || p != current)
                        .collect();
                    violations.push(format!(
                        "slot {} voice {}: no feasible pitch",
                        site.slot,
                        genome.voice(v)
                    ));
                }
                if !pool.is_empty() {
                    genes[site.slot * voices + v] = pool[rng.gen_range(0..pool.len())];
                }
            }
        }

        let child = Candidate::from_valid_genes(Arc::clone(genome.voicing()), genes);
        if violations.is_empty() {
            OperatorResult::Success(child)
        } else {
            OperatorResult::Repaired(
                child,
                RepairInfo {
                    constraint_violations: violations,
                    repair_method: "register_fallback",
                },
            )
        }
    }
}

impl Default for ChordMutation {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

impl MutationOperator<Candidate> for ChordMutation {
    fn mutate<R: Rng>(&self, genome: &Candidate, rng: &mut R) -> OperatorResult<Candidate> {
        let sites = self.draw_sites(genome, rng);
        self.mutate_sites(genome, &sites, rng)
    }
}
