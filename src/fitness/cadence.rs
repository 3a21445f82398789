//! Cadence formulas
//!
//! A cadence is a final chord (a triad on `target`) approached from one of a
//! small set of chords. Approach chords are written as progression symbols:
//! upper case for triads, lower case for sevenths.

use crate::pitch::{ChordSymbol, Step};

/// One closing formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Progression symbols allowed on the penultimate slot
    pub approach: &'static str,
    /// Root of the closing triad
    pub target: Step,
}

impl Cadence {
    /// Check whether the progression ends with this formula
    pub fn matches(&self, symbols: &[ChordSymbol]) -> bool {
        match symbols {
            [.., penult, last] => {
                *last == ChordSymbol::Triad(self.target)
                    && self.approach.contains(penult.as_char())
            }
            _ => false,
        }
    }
}

/// The recognised closing formulas
pub const CADENCES: [Cadence; 6] = [
    Cadence {
        approach: "GFgf",
        target: Step::C,
    },
    Cadence {
        approach: "CAa",
        target: Step::D,
    },
    Cadence {
        approach: "DFA",
        target: Step::E,
    },
    Cadence {
        approach: "C",
        target: Step::F,
    },
    Cadence {
        approach: "DFAdf",
        target: Step::G,
    },
    Cadence {
        approach: "EGeg",
        target: Step::A,
    },
];

/// Check whether the progression ends with any recognised formula
pub fn matches_any(symbols: &[ChordSymbol]) -> bool {
    CADENCES.iter().any(|c| c.matches(symbols))
}
