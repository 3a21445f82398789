//! Chord classification
//!
//! Chords are classified from their figured-bass numbers (the intervals of
//! every note above the lowest, reduced into 2..=7) and their letter set,
//! against the seven diatonic seventh-chord spellings of C major.

use std::fmt;

use crate::pitch::{is_consonant_interval, Pitch, Step, StepSet, Voice};

/// Set of figured-bass numbers (2..=7), stored as a bit mask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Figures(u8);

impl Figures {
    /// Build a set from a list of numbers
    pub const fn of(numbers: &[u8]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < numbers.len() {
            bits |= 1 << numbers[i];
            i += 1;
        }
        Self(bits)
    }

    /// Check membership
    pub fn contains(self, n: u8) -> bool {
        n < 8 && self.0 & (1 << n) != 0
    }

    /// Check whether every member of `other` is in this set
    pub fn contains_all(self, other: Figures) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether every member of this set is in `other`
    pub fn is_subset(self, other: Figures) -> bool {
        other.contains_all(self)
    }

    /// Members from highest to lowest
    pub fn descending(self) -> Vec<u8> {
        (2..=7).rev().filter(|&n| self.contains(n)).collect()
    }
}

const TRIAD_SHAPES: [Figures; 4] = [
    Figures::of(&[5, 3]),
    Figures::of(&[3]),
    Figures::of(&[6, 3]),
    Figures::of(&[6, 4]),
];

const SEVENTH_SHAPES: [Figures; 7] = [
    Figures::of(&[7, 5, 3]),
    Figures::of(&[7, 3]),
    Figures::of(&[6, 5, 3]),
    Figures::of(&[6, 5]),
    Figures::of(&[6, 4, 3]),
    Figures::of(&[6, 4, 2]),
    Figures::of(&[4, 2]),
];

const ROOT_POSITION: Figures = Figures::of(&[7, 5, 3]);
const DIMINISHED_ROOT_POSITION: Figures = Figures::of(&[6, 3]);

/// Lowest pitch of a chord
pub fn bottom(chord: &[Pitch]) -> Option<Pitch> {
    chord.iter().copied().min()
}

/// Highest pitch of a chord
pub fn top(chord: &[Pitch]) -> Option<Pitch> {
    chord.iter().copied().max()
}

/// Figured-bass numbers of every note above the lowest, reduced mod 7 into
/// 1..=7, with the unison dropped
pub fn get_numbers(chord: &[Pitch]) -> Figures {
    let Some(lowest) = bottom(chord) else {
        return Figures::default();
    };
    chord
        .iter()
        .map(|p| ((p.ordinal() - lowest.ordinal()) % 7 + 1) as u8)
        .filter(|&n| n > 1)
        .fold(Figures::default(), |set, n| Figures(set.0 | 1 << n))
}

/// Letters of the diatonic seventh chord built on `root`
pub fn seventh_spelling(root: Step) -> [Step; 4] {
    [root, root.up(2), root.up(4), root.up(6)]
}

/// Root of the first seventh-chord spelling (tried in voice order) that
/// contains every letter of the chord
pub fn get_root(chord: &[Pitch]) -> Option<Step> {
    let letters = StepSet::of_pitches(chord);
    chord.iter().map(|p| p.step()).find(|&root| {
        StepSet::of(&seventh_spelling(root)).is_superset(letters)
    })
}

/// Root letter if the chord is a triad shape, excluding the leading-tone
/// diminished triad
pub fn triad_chord_test(chord: &[Pitch]) -> Option<Step> {
    if StepSet::of_pitches(chord) == StepSet::DIMINISHED {
        return None;
    }
    let numbers = get_numbers(chord);
    if !TRIAD_SHAPES.contains(&numbers) {
        return None;
    }
    get_root(chord)
}

/// Progression symbol if the chord is a seventh shape; the leading-tone
/// diminished triad is reported here as well
pub fn seventh_chord_test(chord: &[Pitch]) -> Option<ChordSymbol> {
    if StepSet::of_pitches(chord) == StepSet::DIMINISHED {
        return Some(ChordSymbol::Diminished);
    }
    let numbers = get_numbers(chord);
    if !SEVENTH_SHAPES.contains(&numbers) {
        return None;
    }
    get_root(chord).map(ChordSymbol::Seventh)
}

/// Whether the lowest note is the chord's root
pub fn is_root_position(chord: &[Pitch]) -> bool {
    let numbers = get_numbers(chord);
    if StepSet::of_pitches(chord) == StepSet::DIMINISHED {
        return numbers == DIMINISHED_ROOT_POSITION;
    }
    numbers.contains(3) && numbers.is_subset(ROOT_POSITION)
}

/// Indices (in voice order) of the notes carrying the chord's seventh
pub fn locate_seventh_note(chord: &[Pitch]) -> Vec<usize> {
    let seventh = if StepSet::of_pitches(chord) == StepSet::DIMINISHED {
        Step::F
    } else {
        match get_root(chord) {
            Some(root) => seventh_spelling(root)[3],
            None => return Vec::new(),
        }
    };
    chord
        .iter()
        .enumerate()
        .filter(|(_, p)| p.step() == seventh)
        .map(|(i, _)| i)
        .collect()
}

/// Every pair of notes consonant, fourths allowed
pub fn is_consonant_chord(chord: &[Pitch]) -> bool {
    chord.iter().enumerate().all(|(i, &a)| {
        chord[i..]
            .iter()
            .all(|&b| is_consonant_interval(a, b, true))
    })
}

/// Every note consonant against the lowest, fourths disallowed. With
/// `check_bass`, the lowest note must also be sung by a bass voice.
pub fn is_consonant_chord_from_bass(chord: &[Pitch], voices: &[Voice], check_bass: bool) -> bool {
    let Some(lowest) = bottom(chord) else {
        return true;
    };
    let bass_ok = !check_bass
        || chord
            .iter()
            .position(|&p| p == lowest)
            .and_then(|i| voices.get(i))
            .is_some_and(|&v| v == Voice::Bass);
    bass_ok
        && chord
            .iter()
            .all(|&p| is_consonant_interval(lowest, p, false))
}

/// Harmonic symbol of one slot in the progression string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordSymbol {
    /// Triad on the given root (upper-case letter)
    Triad(Step),
    /// Seventh chord on the given root (lower-case letter)
    Seventh(Step),
    /// Leading-tone diminished triad (`B`)
    Diminished,
    /// Neither triad nor seventh (`X`)
    NonChord,
}

impl ChordSymbol {
    /// Classify a chord
    pub fn of(chord: &[Pitch]) -> Self {
        if let Some(root) = triad_chord_test(chord) {
            return ChordSymbol::Triad(root);
        }
        seventh_chord_test(chord).unwrap_or(ChordSymbol::NonChord)
    }

    /// Character used in the progression string
    pub fn as_char(self) -> char {
        match self {
            ChordSymbol::Triad(root) => root.as_char(),
            ChordSymbol::Seventh(root) => root.as_char().to_ascii_lowercase(),
            ChordSymbol::Diminished => 'B',
            ChordSymbol::NonChord => 'X',
        }
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Triad/seventh and root/inversion class of one slot in the series string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    RootTriad,
    InvertedTriad,
    RootSeventh,
    InvertedSeventh,
    NonChord,
}

impl ChordQuality {
    /// Classify a chord
    pub fn of(chord: &[Pitch]) -> Self {
        let root_position = is_root_position(chord);
        if triad_chord_test(chord).is_some() {
            if root_position {
                ChordQuality::RootTriad
            } else {
                ChordQuality::InvertedTriad
            }
        } else if seventh_chord_test(chord).is_some() {
            if root_position {
                ChordQuality::RootSeventh
            } else {
                ChordQuality::InvertedSeventh
            }
        } else {
            ChordQuality::NonChord
        }
    }

    /// Character used in the series string
    pub fn as_char(self) -> char {
        match self {
            ChordQuality::RootTriad => 'T',
            ChordQuality::InvertedTriad => 't',
            ChordQuality::RootSeventh => 'S',
            ChordQuality::InvertedSeventh => 's',
            ChordQuality::NonChord => 'X',
        }
    }

    /// Parse a series character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'T' => Some(ChordQuality::RootTriad),
            't' => Some(ChordQuality::InvertedTriad),
            'S' => Some(ChordQuality::RootSeventh),
            's' => Some(ChordQuality::InvertedSeventh),
            'X' => Some(ChordQuality::NonChord),
            _ => None,
        }
    }

    /// Root-position or inverted triad
    pub fn is_triad(self) -> bool {
        matches!(self, ChordQuality::RootTriad | ChordQuality::InvertedTriad)
    }

    /// Seventh chord or non-chord: the slots that count as dissonant
    pub fn is_dissonant(self) -> bool {
        !self.is_triad()
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
