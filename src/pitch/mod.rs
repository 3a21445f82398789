//! Tonal pitch model
//!
//! A fixed diatonic gamut of 28 pitches (C2..B5), the four voice registers,
//! and the chord-classification primitives the fitness rules are built on.

pub mod chord;
pub mod voice;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use chord::*;
pub use voice::*;

/// Diatonic letter name (scale step of C major)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// All steps in scale order
    pub const ALL: [Step; 7] = [
        Step::C,
        Step::D,
        Step::E,
        Step::F,
        Step::G,
        Step::A,
        Step::B,
    ];

    /// Position within the scale (C = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Step reached by moving `steps` scale degrees upward
    pub fn up(self, steps: usize) -> Step {
        Self::ALL[(self.index() + steps) % 7]
    }

    /// Upper-case letter name
    pub fn as_char(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    /// Parse an upper- or lower-case letter name
    pub fn from_char(c: char) -> Option<Step> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_char() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Set of letter names, stored as a 7-bit mask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StepSet(u8);

impl StepSet {
    /// The leading-tone diminished triad {B, D, F}
    pub const DIMINISHED: StepSet = StepSet::of(&[Step::B, Step::D, Step::F]);
    /// The tritone pair {B, F}
    pub const TRITONE: StepSet = StepSet::of(&[Step::B, Step::F]);

    /// Build a set from a list of steps
    pub const fn of(steps: &[Step]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < steps.len() {
            bits |= 1 << steps[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    /// Letter set of the given pitches
    pub fn of_pitches(pitches: &[Pitch]) -> Self {
        pitches.iter().fold(Self::default(), |set, p| set.with(p.step()))
    }

    /// Set with `step` added
    pub fn with(self, step: Step) -> Self {
        Self(self.0 | 1 << step as u8)
    }

    /// Check membership
    pub fn contains(self, step: Step) -> bool {
        self.0 & (1 << step as u8) != 0
    }

    /// Check whether every member of `other` is in this set
    pub fn is_superset(self, other: StepSet) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A pitch of the four-octave diatonic gamut, ordered by ordinal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[rustfmt::skip]
pub enum Pitch {
    C2, D2, E2, F2, G2, A2, B2,
    C3, D3, E3, F3, G3, A3, B3,
    C4, D4, E4, F4, G4, A4, B4,
    C5, D5, E5, F5, G5, A5, B5,
}

impl Pitch {
    /// Number of pitches in the gamut
    pub const COUNT: usize = 28;

    /// Every pitch in ascending order
    #[rustfmt::skip]
    pub const ALL: [Pitch; Pitch::COUNT] = [
        Pitch::C2, Pitch::D2, Pitch::E2, Pitch::F2, Pitch::G2, Pitch::A2, Pitch::B2,
        Pitch::C3, Pitch::D3, Pitch::E3, Pitch::F3, Pitch::G3, Pitch::A3, Pitch::B3,
        Pitch::C4, Pitch::D4, Pitch::E4, Pitch::F4, Pitch::G4, Pitch::A4, Pitch::B4,
        Pitch::C5, Pitch::D5, Pitch::E5, Pitch::F5, Pitch::G5, Pitch::A5, Pitch::B5,
    ];

    /// Look up a pitch by ordinal
    pub fn from_ordinal(ordinal: usize) -> Option<Pitch> {
        Self::ALL.get(ordinal).copied()
    }

    /// Position in the gamut (C2 = 0)
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Letter name
    pub fn step(self) -> Step {
        Step::ALL[self.ordinal() % 7]
    }

    /// Octave number, 2 through 5
    pub fn octave(self) -> u8 {
        2 + (self.ordinal() / 7) as u8
    }

    /// Signed distance in scale steps from `self` to `other`
    pub fn steps_to(self, other: Pitch) -> i32 {
        other.ordinal() as i32 - self.ordinal() as i32
    }

    /// Diatonic interval class: the absolute step distance reduced mod 7
    pub fn interval_class(self, other: Pitch) -> usize {
        self.steps_to(other).unsigned_abs() as usize % 7
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.step(), self.octave())
    }
}

/// True if the two pitches spell the forbidden B/F tritone
pub fn is_tritone_pair(a: Pitch, b: Pitch) -> bool {
    StepSet::of_pitches(&[a, b]) == StepSet::TRITONE
}

/// Consonance of two pitches by diatonic interval class.
///
/// Unisons/octaves, thirds, fifths and sixths are consonant; the fourth only
/// when `fourth_consonant` is set. The B/F pair is never consonant.
pub fn is_consonant_interval(a: Pitch, b: Pitch, fourth_consonant: bool) -> bool {
    if is_tritone_pair(a, b) {
        return false;
    }
    match a.interval_class(b) {
        0 | 2 | 4 | 5 => true,
        3 => fourth_consonant,
        _ => false,
    }
}
