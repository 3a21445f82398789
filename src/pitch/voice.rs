//! Voices and registers
//!
//! Each voice role owns a closed register of legal pitches. A `Voicing` is
//! the ordered list of roles that make up one chord (e.g. `SATB`, `SAATTB`).

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::pitch::Pitch;

/// Closed range of pitches a voice may sing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Lowest legal pitch (inclusive)
    pub low: Pitch,
    /// Highest legal pitch (inclusive)
    pub high: Pitch,
}

impl Register {
    /// Create a new register
    ///
    /// # Panics
    /// Panics if low > high
    pub fn new(low: Pitch, high: Pitch) -> Self {
        assert!(
            low <= high,
            "Invalid register: low ({}) must be <= high ({})",
            low,
            high
        );
        Self { low, high }
    }

    /// Check if a pitch is within the register
    pub fn contains(&self, pitch: Pitch) -> bool {
        pitch >= self.low && pitch <= self.high
    }

    /// Number of pitches in the register
    pub fn len(&self) -> usize {
        self.high.ordinal() - self.low.ordinal() + 1
    }

    /// Registers are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over every pitch in the register, ascending
    pub fn pitches(&self) -> impl Iterator<Item = Pitch> {
        Pitch::ALL[self.low.ordinal()..=self.high.ordinal()]
            .iter()
            .copied()
    }

    /// Draw a pitch uniformly from the register
    pub fn random<R: Rng>(&self, rng: &mut R) -> Pitch {
        Pitch::ALL[rng.gen_range(self.low.ordinal()..=self.high.ordinal())]
    }
}

/// One of the four vocal roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Soprano,
    Alto,
    Tenor,
    Bass,
}

impl Voice {
    /// Parse a single-letter voice label
    pub fn from_label(label: char) -> Result<Voice, GenomeError> {
        match label {
            'S' => Ok(Voice::Soprano),
            'A' => Ok(Voice::Alto),
            'T' => Ok(Voice::Tenor),
            'B' => Ok(Voice::Bass),
            other => Err(GenomeError::UnknownVoice(other)),
        }
    }

    /// Single-letter label
    pub fn label(self) -> char {
        match self {
            Voice::Soprano => 'S',
            Voice::Alto => 'A',
            Voice::Tenor => 'T',
            Voice::Bass => 'B',
        }
    }

    /// The voice's register
    pub fn register(self) -> Register {
        match self {
            Voice::Soprano => Register::new(Pitch::G4, Pitch::A5),
            Voice::Alto => Register::new(Pitch::G3, Pitch::C5),
            Voice::Tenor => Register::new(Pitch::C3, Pitch::F4),
            Voice::Bass => Register::new(Pitch::E2, Pitch::C4),
        }
    }

    /// Alto and tenor are inner voices
    pub fn is_inner(self) -> bool {
        matches!(self, Voice::Alto | Voice::Tenor)
    }

    /// Soprano and bass are outer voices
    pub fn is_outer(self) -> bool {
        !self.is_inner()
    }

    /// Draw a random pitch from this voice's register
    pub fn random_pitch<R: Rng>(self, rng: &mut R) -> Pitch {
        self.register().random(rng)
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ordered voice roles of a chord, e.g. `SATB`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Voicing {
    voices: Vec<Voice>,
}

impl Voicing {
    /// Create a voicing from a list of voices
    pub fn new(voices: Vec<Voice>) -> Result<Self, GenomeError> {
        if voices.is_empty() {
            return Err(GenomeError::InvalidStructure(
                "Voicing needs at least one voice".to_string(),
            ));
        }
        Ok(Self { voices })
    }

    /// Standard four-part soprano/alto/tenor/bass voicing
    pub fn satb() -> Self {
        Self {
            voices: vec![Voice::Soprano, Voice::Alto, Voice::Tenor, Voice::Bass],
        }
    }

    /// Number of voices
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Always false: a voicing holds at least one voice
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Voice at position `index`
    pub fn voice(&self, index: usize) -> Voice {
        self.voices[index]
    }

    /// The voices in order
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Iterate over the voices in order
    pub fn iter(&self) -> impl Iterator<Item = Voice> + '_ {
        self.voices.iter().copied()
    }

    /// True if voices `i` and `j` form a soprano/bass pair
    pub fn is_outer_pair(&self, i: usize, j: usize) -> bool {
        matches!(
            (self.voices[i], self.voices[j]),
            (Voice::Soprano, Voice::Bass) | (Voice::Bass, Voice::Soprano)
        )
    }
}

impl Default for Voicing {
    fn default() -> Self {
        Self::satb()
    }
}

impl FromStr for Voicing {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let voices = s
            .chars()
            .map(Voice::from_label)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(voices)
    }
}

impl TryFrom<String> for Voicing {
    type Error = GenomeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Voicing> for String {
    fn from(voicing: Voicing) -> Self {
        voicing.to_string()
    }
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for voice in &self.voices {
            write!(f, "{}", voice)?;
        }
        Ok(())
    }
}
