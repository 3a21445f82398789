//! Voice-leading candidate genome
//!
//! A candidate is a fixed-length sequence of pitches laid out chord-slot
//! major: all voices of slot 0, then all voices of slot 1, and so on. It is
//! immutable once built; harmonic views are computed on first access.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::genome::traits::EvolutionaryGenome;
use crate::pitch::{get_numbers, ChordQuality, ChordSymbol, Figures, Pitch, Step, Voice, Voicing};

/// Shape of a candidate: its voicing and number of chord slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordLayout {
    /// Shared voicing
    pub voicing: Arc<Voicing>,
    /// Number of chord slots
    pub chord_count: usize,
}

impl ChordLayout {
    /// Create a new layout
    pub fn new(voicing: Voicing, chord_count: usize) -> Self {
        Self {
            voicing: Arc::new(voicing),
            chord_count,
        }
    }

    /// Number of genes a candidate of this layout carries
    pub fn gene_count(&self) -> usize {
        self.voicing.len() * self.chord_count
    }
}

/// A four(+)-part chord progression under evolution
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCandidate")]
pub struct Candidate {
    voicing: Arc<Voicing>,
    genes: Vec<Pitch>,
    #[serde(skip)]
    symbols: OnceLock<Vec<ChordSymbol>>,
    #[serde(skip)]
    qualities: OnceLock<Vec<ChordQuality>>,
    #[serde(skip)]
    progression: OnceLock<String>,
    #[serde(skip)]
    series: OnceLock<String>,
    #[serde(skip)]
    figured_numerals: OnceLock<Vec<Vec<u8>>>,
}

#[derive(Deserialize)]
struct RawCandidate {
    voicing: Voicing,
    genes: Vec<Pitch>,
}

impl TryFrom<RawCandidate> for Candidate {
    type Error = GenomeError;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        Candidate::new(Arc::new(raw.voicing), raw.genes)
    }
}

impl Candidate {
    /// Create a candidate from explicit pitches, checking every gene
    /// against its voice's register
    pub fn new(voicing: Arc<Voicing>, genes: Vec<Pitch>) -> Result<Self, GenomeError> {
        let voices = voicing.len();
        if genes.is_empty() || genes.len() % voices != 0 {
            return Err(GenomeError::DimensionMismatch {
                expected: voices * (genes.len() / voices).max(1),
                actual: genes.len(),
            });
        }
        for (i, &pitch) in genes.iter().enumerate() {
            let voice = voicing.voice(i % voices);
            let register = voice.register();
            if !register.contains(pitch) {
                return Err(GenomeError::InvalidRepresentation {
                    voice,
                    pitch,
                    low: register.low,
                    high: register.high,
                });
            }
        }
        Ok(Self::from_valid_genes(voicing, genes))
    }

    /// Create a candidate from pitch ordinals
    pub fn from_ordinals(voicing: Arc<Voicing>, ordinals: &[usize]) -> Result<Self, GenomeError> {
        let voices = voicing.len();
        let genes = ordinals
            .iter()
            .enumerate()
            .map(|(i, &ordinal)| {
                Pitch::from_ordinal(ordinal).ok_or(GenomeError::UnknownPitch {
                    voice: voicing.voice(i % voices),
                    ordinal,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(voicing, genes)
    }

    /// Create a candidate from one chord per slot, each listed in voice order
    pub fn from_chords(voicing: Arc<Voicing>, chords: &[&[Pitch]]) -> Result<Self, GenomeError> {
        let voices = voicing.len();
        if let Some(chord) = chords.iter().find(|c| c.len() != voices) {
            return Err(GenomeError::DimensionMismatch {
                expected: voices,
                actual: chord.len(),
            });
        }
        Self::new(voicing, chords.concat())
    }

    /// Random candidate: every gene drawn uniformly from its voice's register
    pub fn random<R: Rng>(rng: &mut R, voicing: Arc<Voicing>, chord_count: usize) -> Self {
        let genes = (0..chord_count)
            .flat_map(|_| voicing.iter())
            .map(|voice| voice.random_pitch(rng))
            .collect();
        Self::from_valid_genes(voicing, genes)
    }

    /// Build a sibling candidate with the same voicing. The genes must come
    /// from in-register sources (other candidates or register draws).
    pub(crate) fn from_valid_genes(voicing: Arc<Voicing>, genes: Vec<Pitch>) -> Self {
        debug_assert!(genes.len() % voicing.len() == 0);
        Self {
            voicing,
            genes,
            symbols: OnceLock::new(),
            qualities: OnceLock::new(),
            progression: OnceLock::new(),
            series: OnceLock::new(),
            figured_numerals: OnceLock::new(),
        }
    }

    /// The candidate's layout
    pub fn layout(&self) -> ChordLayout {
        ChordLayout {
            voicing: Arc::clone(&self.voicing),
            chord_count: self.chord_count(),
        }
    }

    /// The shared voicing
    pub fn voicing(&self) -> &Arc<Voicing> {
        &self.voicing
    }

    /// All pitches, slot-major
    pub fn pitches(&self) -> &[Pitch] {
        &self.genes
    }

    /// Number of genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Always false for a constructed candidate
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Number of voices per chord
    pub fn voice_count(&self) -> usize {
        self.voicing.len()
    }

    /// Number of chord slots
    pub fn chord_count(&self) -> usize {
        self.genes.len() / self.voicing.len()
    }

    /// Pitch sung by `voice` at `slot`
    pub fn gene(&self, slot: usize, voice: usize) -> Pitch {
        self.genes[slot * self.voice_count() + voice]
    }

    /// Role of the voice at index `voice`
    pub fn voice(&self, voice: usize) -> Voice {
        self.voicing.voice(voice)
    }

    /// One voice across all slots
    pub fn melody(&self, voice: usize) -> Vec<Pitch> {
        self.genes
            .iter()
            .skip(voice)
            .step_by(self.voice_count())
            .copied()
            .collect()
    }

    /// Every voice's melody, in voice order
    pub fn melodies(&self) -> Vec<Vec<Pitch>> {
        (0..self.voice_count()).map(|v| self.melody(v)).collect()
    }

    /// All voices at one slot
    pub fn chord(&self, slot: usize) -> &[Pitch] {
        let n = self.voice_count();
        &self.genes[slot * n..(slot + 1) * n]
    }

    /// Iterate over the chords in slot order
    pub fn chords(&self) -> impl Iterator<Item = &[Pitch]> {
        self.genes.chunks(self.voice_count())
    }

    /// The final chord
    pub fn last_chord(&self) -> &[Pitch] {
        self.chord(self.chord_count() - 1)
    }

    /// Harmonic symbol per slot
    pub fn symbols(&self) -> &[ChordSymbol] {
        self.symbols
            .get_or_init(|| self.chords().map(ChordSymbol::of).collect())
    }

    /// Chord quality per slot
    pub fn qualities(&self) -> &[ChordQuality] {
        self.qualities
            .get_or_init(|| self.chords().map(ChordQuality::of).collect())
    }

    /// Bracketed root-letter string, e.g. `[CFgC]`
    pub fn progression(&self) -> &str {
        self.progression.get_or_init(|| {
            let body: String = self.symbols().iter().map(|s| s.as_char()).collect();
            format!("[{}]", body)
        })
    }

    /// Bracketed quality string, e.g. `[TtST]`
    pub fn series(&self) -> &str {
        self.series.get_or_init(|| {
            let body: String = self.qualities().iter().map(|q| q.as_char()).collect();
            format!("[{}]", body)
        })
    }

    /// True if some slot is neither a triad nor a seventh chord
    pub fn has_non_chord(&self) -> bool {
        self.symbols().contains(&ChordSymbol::NonChord)
    }

    /// Figured-bass numbers per slot, highest first
    pub fn figured_numerals(&self) -> &[Vec<u8>] {
        self.figured_numerals
            .get_or_init(|| self.chords().map(|c| get_numbers(c).descending()).collect())
    }

    fn slot_figures(&self, slot: usize) -> Figures {
        Figures::of(&self.figured_numerals()[slot])
    }

    /// Plain-text figure of one slot, e.g. `V_6/5`
    pub fn text_figure(&self, slot: usize) -> String {
        let symbol = self.symbols()[slot];
        let Some(roman) = roman_numeral(symbol) else {
            return "-".to_string();
        };
        let mut figure = roman.to_uppercase();
        match inversion_figure(self.slot_figures(slot)) {
            Some((Some(upper), lower)) => figure.push_str(&format!("_{}/{}", upper, lower)),
            Some((None, lower)) => figure.push_str(&format!("_{}", lower)),
            None => {}
        }
        figure
    }

    /// LaTeX figure of one slot, e.g. `$\myChord{V}{\ }{6}{5}$`
    pub fn latex_figure(&self, slot: usize) -> String {
        let symbol = self.symbols()[slot];
        let Some(roman) = roman_numeral(symbol) else {
            return "-".to_string();
        };
        let quality = match symbol {
            ChordSymbol::Diminished => "\\circ",
            ChordSymbol::Seventh(Step::B) => "\\textrm{\\diameter}",
            _ => "\\ ",
        };
        let (upper, lower) = match inversion_figure(self.slot_figures(slot)) {
            Some((upper, lower)) => (upper.unwrap_or("\\ "), lower),
            None => ("\\ ", "\\ "),
        };
        format!("$\\myChord{{{}}}{{{}}}{{{}}}{{{}}}$", roman, quality, upper, lower)
    }

    /// Roman-numeral analysis of the whole progression
    pub fn to_roman_numerals(&self, latex: bool) -> String {
        let slots = 0..self.chord_count();
        if latex {
            slots
                .map(|i| self.latex_figure(i))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            slots
                .map(|i| self.text_figure(i))
                .collect::<Vec<_>>()
                .join("  ")
        }
    }

    /// Check that `other` shares this candidate's voicing and length
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.voicing == other.voicing && self.genes.len() == other.genes.len()
    }
}

/// Scale-degree numeral of a chord symbol; `None` for non-chords
pub fn roman_numeral(symbol: ChordSymbol) -> Option<&'static str> {
    let root = match symbol {
        ChordSymbol::Triad(step) | ChordSymbol::Seventh(step) => step,
        ChordSymbol::Diminished => Step::B,
        ChordSymbol::NonChord => return None,
    };
    Some(match root {
        Step::C => "I",
        Step::D => "ii",
        Step::E => "iii",
        Step::F => "IV",
        Step::G => "V",
        Step::A => "vi",
        Step::B => "vii",
    })
}

/// Inversion figure as (upper, lower) numbers, checked from the most
/// specific shape down
fn inversion_figure(numbers: Figures) -> Option<(Option<&'static str>, &'static str)> {
    if numbers.contains(7) {
        Some((None, "7"))
    } else if numbers.contains_all(Figures::of(&[6, 5])) {
        Some((Some("6"), "5"))
    } else if numbers.contains_all(Figures::of(&[4, 3])) {
        Some((Some("4"), "3"))
    } else if numbers.contains(2) {
        Some((Some("4"), "2"))
    } else if numbers.contains_all(Figures::of(&[6, 4])) {
        Some((Some("6"), "4"))
    } else if numbers.contains_all(Figures::of(&[6, 3])) {
        Some((None, "6"))
    } else {
        None
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.voicing == other.voicing && self.genes == other.genes
    }
}

impl Eq for Candidate {}

impl std::hash::Hash for Candidate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.voicing.hash(state);
        self.genes.hash(state);
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("voicing", &self.voicing.to_string())
            .field("genes", &self.genes)
            .finish()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self.voicing.iter().map(|v| format!(" {}", v)).collect();
        writeln!(f, "[{}]", header.join(", "))?;
        for chord in self.chords() {
            let notes: Vec<String> = chord.iter().map(|p| p.to_string()).collect();
            writeln!(f, "[{}]", notes.join(", "))?;
        }
        writeln!(f, "{}", "-".repeat(self.voice_count() * 4))?;
        writeln!(f, "Harmonic Progression:")?;
        write!(f, "{}", self.to_roman_numerals(false))
    }
}

impl EvolutionaryGenome for Candidate {
    type Layout = ChordLayout;

    fn generate<R: Rng>(rng: &mut R, layout: &ChordLayout) -> Self {
        Self::random(rng, Arc::clone(&layout.voicing), layout.chord_count)
    }
}
