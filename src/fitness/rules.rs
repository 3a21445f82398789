//! Voice-leading rules
//!
//! Each rule counts defects in a candidate. A rule never fails on a
//! structurally valid candidate; its contribution to the penalty is
//! `weight × count`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fitness::cadence;
use crate::genome::candidate::Candidate;
use crate::pitch::{
    get_root, is_tritone_pair, locate_seventh_note, seventh_chord_test, top, ChordQuality, Pitch,
    Step, Voice, Voicing,
};

/// Melodic steps an alto or tenor may take
const INNER_INTERVALS: [i32; 7] = [0, 1, 2, 3, -1, -2, -3];

/// Melodic steps a soprano or bass may take
const OUTER_INTERVALS: [i32; 11] = [1, 2, 3, 4, 5, 7, -1, -2, -3, -4, -7];

/// The voice-leading rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Awkward melodic figures and melodies with more skips than steps
    MelodicSmoothness,
    /// Parallel unisons, octaves and fifths
    VoiceIndependence,
    /// Soprano not on top or bass not at the bottom
    ImproperOuterVoices,
    /// Slots that are neither triads nor seventh chords
    NotTriadOrSeventhChord,
    /// Unresolved sevenths and leading tones
    ImproperResolution,
    /// Adjacent slots that are both dissonant
    SuccessiveDissonantChords,
    /// Progression not opening on a triad
    StartWithNonTriad,
    /// Missing or malformed final cadence
    ImproperCadentialForm,
}

impl Rule {
    /// Every rule, in evaluation order
    pub const ALL: [Rule; 8] = [
        Rule::MelodicSmoothness,
        Rule::VoiceIndependence,
        Rule::ImproperOuterVoices,
        Rule::NotTriadOrSeventhChord,
        Rule::ImproperResolution,
        Rule::SuccessiveDissonantChords,
        Rule::StartWithNonTriad,
        Rule::ImproperCadentialForm,
    ];

    /// Penalty per defect
    pub fn default_weight(self) -> f64 {
        match self {
            Rule::MelodicSmoothness => 0.01,
            Rule::VoiceIndependence => 0.035,
            Rule::ImproperOuterVoices => 0.25,
            Rule::NotTriadOrSeventhChord => 0.05,
            Rule::ImproperResolution => 0.015,
            Rule::SuccessiveDissonantChords => 0.02,
            Rule::StartWithNonTriad => 0.03,
            Rule::ImproperCadentialForm => 0.06,
        }
    }

    /// Rule name
    pub fn name(self) -> &'static str {
        match self {
            Rule::MelodicSmoothness => "MelodicSmoothness",
            Rule::VoiceIndependence => "VoiceIndependence",
            Rule::ImproperOuterVoices => "ImproperOuterVoices",
            Rule::NotTriadOrSeventhChord => "NotTriadOrSeventhChord",
            Rule::ImproperResolution => "ImproperResolution",
            Rule::SuccessiveDissonantChords => "SuccessiveDissonantChords",
            Rule::StartWithNonTriad => "StartWithNonTriad",
            Rule::ImproperCadentialForm => "ImproperCadentialForm",
        }
    }

    /// Count this rule's defects in a candidate
    pub fn defects(self, candidate: &Candidate) -> usize {
        match self {
            Rule::MelodicSmoothness => (0..candidate.voice_count())
                .map(|v| melodic_infeasibility_count(candidate.voice(v), &candidate.melody(v)))
                .sum(),
            Rule::VoiceIndependence => voice_independence_count(candidate),
            Rule::ImproperOuterVoices => candidate
                .chords()
                .map(|chord| improper_outer_voice_count(chord, candidate.voicing()))
                .sum(),
            Rule::NotTriadOrSeventhChord => candidate
                .qualities()
                .iter()
                .filter(|&&q| q == ChordQuality::NonChord)
                .count(),
            Rule::ImproperResolution => {
                improper_seventh_resolution(candidate) + improper_leading_tone_resolution(candidate)
            }
            Rule::SuccessiveDissonantChords => candidate
                .qualities()
                .windows(2)
                .filter(|pair| pair[0].is_dissonant() && pair[1].is_dissonant())
                .count(),
            Rule::StartWithNonTriad => match candidate.qualities().first() {
                Some(q) if q.is_triad() => 0,
                _ => 1,
            },
            Rule::ImproperCadentialForm => improper_cadential_form(candidate),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a melodic figure (two or three notes) is singable by `voice`
pub fn is_melodic_feasible(voice: Voice, figure: &[Pitch]) -> bool {
    if figure.windows(2).any(|w| is_tritone_pair(w[0], w[1])) {
        return false;
    }
    let mut steps: Vec<i32> = figure.windows(2).map(|w| w[0].steps_to(w[1])).collect();
    steps.sort_unstable();

    let (whitelist, max_span): (&[i32], i32) = if voice.is_inner() {
        (&INNER_INTERVALS, 5)
    } else {
        (&OUTER_INTERVALS, 7)
    };
    steps.iter().all(|s| whitelist.contains(s))
        && match steps.as_slice() {
            [first, second, ..] => (first + second).abs() <= max_span,
            _ => true,
        }
}

/// Infeasible three-note figures plus the excess of skips over steps
pub fn melodic_infeasibility_count(voice: Voice, melody: &[Pitch]) -> usize {
    let figures = melody
        .windows(3)
        .filter(|figure| !is_melodic_feasible(voice, figure))
        .count();
    let (skips, steps) = melody.windows(2).fold((0usize, 0usize), |(skips, steps), w| {
        if w[0].steps_to(w[1]).abs() > 1 {
            (skips + 1, steps)
        } else {
            (skips, steps + 1)
        }
    });
    figures + skips.saturating_sub(steps)
}

/// Parallel perfect intervals between two melodies. For the soprano/bass
/// pair, any similar motion into a perfect interval also counts.
pub fn voice_independence_check(m1: &[Pitch], m2: &[Pitch], outer_pair: bool) -> usize {
    let len = m1.len().min(m2.len());
    (1..len)
        .filter(|&t| {
            if is_tritone_pair(m1[t], m2[t]) {
                return false;
            }
            let curr = m1[t].interval_class(m2[t]);
            if curr != 0 && curr != 4 {
                return false;
            }
            let prev = m1[t - 1].interval_class(m2[t - 1]);
            let motion = m1[t - 1].steps_to(m1[t]) * m2[t - 1].steps_to(m2[t]);
            (prev == curr && motion != 0) || (outer_pair && motion > 0)
        })
        .count()
}

fn voice_independence_count(candidate: &Candidate) -> usize {
    let melodies = candidate.melodies();
    let voicing = candidate.voicing();
    let n = melodies.len();
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| voice_independence_check(&melodies[i], &melodies[j], voicing.is_outer_pair(i, j)))
        .sum()
}

/// Soprano voices not holding the highest pitch, bass voices not holding
/// the lowest
pub fn improper_outer_voice_count(chord: &[Pitch], voicing: &Voicing) -> usize {
    let (Some(highest), Some(lowest)) = (chord.iter().max(), chord.iter().min()) else {
        return 0;
    };
    chord
        .iter()
        .zip(voicing.iter())
        .filter(|&(pitch, voice)| match voice {
            Voice::Soprano => pitch != highest,
            Voice::Bass => pitch != lowest,
            _ => false,
        })
        .count()
}

/// Chord sevenths that neither hold nor fall by step into the next slot
pub fn improper_seventh_resolution(candidate: &Candidate) -> usize {
    let slots = candidate.chord_count();
    (0..slots.saturating_sub(1))
        .filter(|&slot| seventh_chord_test(candidate.chord(slot)).is_some())
        .map(|slot| {
            locate_seventh_note(candidate.chord(slot))
                .into_iter()
                .filter(|&v| {
                    let step = candidate.gene(slot, v).steps_to(candidate.gene(slot + 1, v));
                    step != 0 && step != -1
                })
                .count()
        })
        .sum()
}

/// Leading tones in the soprano or bass that move anywhere but to the tonic
pub fn improper_leading_tone_resolution(candidate: &Candidate) -> usize {
    (0..candidate.voice_count())
        .filter(|&v| candidate.voice(v).is_outer())
        .map(|v| unresolved_leading_tones(&candidate.melody(v)))
        .sum()
}

/// Count runs of leading tones (`B`) followed by a note other than `C`.
/// The final note is never treated as the start of a run.
pub fn unresolved_leading_tones(melody: &[Pitch]) -> usize {
    let last = melody.len().saturating_sub(1);
    let mut count = 0;
    let mut i = 0;
    while i < last {
        if melody[i].step() != Step::B {
            i += 1;
            continue;
        }
        let mut next = i;
        while next < last && melody[next].step() == Step::B {
            next += 1;
        }
        if melody[next].step() != Step::C {
            count += 1;
        }
        i = next.max(i + 1);
    }
    count
}

/// Sum of the three closing checks: final quality pair, cadence formula,
/// and final root in the top voice
pub fn improper_cadential_form(candidate: &Candidate) -> usize {
    let qualities = candidate.qualities();
    let closing = match qualities {
        [.., penult, ChordQuality::RootTriad] => {
            matches!(penult, ChordQuality::RootSeventh | ChordQuality::RootTriad)
        }
        _ => false,
    };

    let formula = cadence::matches_any(candidate.symbols());

    let last = candidate.last_chord();
    let root_on_top = match (get_root(last), top(last)) {
        (Some(root), Some(highest)) => root == highest.step(),
        _ => false,
    };

    [closing, formula, root_on_top]
        .iter()
        .filter(|&&ok| !ok)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use Pitch::*;

    fn satb(chords: &[&[Pitch]]) -> Candidate {
        Candidate::from_chords(Arc::new(Voicing::satb()), chords).unwrap()
    }

    #[test]
    fn test_constant_inner_melody_is_smooth() {
        assert_eq!(melodic_infeasibility_count(Voice::Alto, &[G4, G4, G4]), 0);
        assert_eq!(melodic_infeasibility_count(Voice::Tenor, &[C4, C4, C4]), 0);
    }

    #[test]
    fn test_outer_voices_must_move() {
        // repeated notes are outside the outer whitelist
        assert_eq!(melodic_infeasibility_count(Voice::Soprano, &[G4, G4, G4]), 1);
        assert_eq!(melodic_infeasibility_count(Voice::Soprano, &[G4, A4, B4]), 0);
    }

    #[test]
    fn test_melodic_figures() {
        assert!(is_melodic_feasible(Voice::Alto, &[G4, A4, G4]));
        // a fifth is too wide for an inner voice
        assert!(!is_melodic_feasible(Voice::Alto, &[G3, D4]));
        assert!(is_melodic_feasible(Voice::Soprano, &[G4, C5]));
        // descending sixth is excluded for outer voices
        assert!(!is_melodic_feasible(Voice::Soprano, &[A5, C5]));
        // B-F pair is never sung
        assert!(!is_melodic_feasible(Voice::Bass, &[F2, B2]));
        // two skips in the same direction spanning more than an octave
        assert!(!is_melodic_feasible(Voice::Bass, &[E2, A2, F3]));
        assert!(is_melodic_feasible(Voice::Bass, &[E2, A2, E3]));
    }

    #[test]
    fn test_skip_step_balance() {
        // two skips, no steps
        assert_eq!(melodic_infeasibility_count(Voice::Soprano, &[G4, B4, D5]), 2);
        // one skip, one step
        assert_eq!(melodic_infeasibility_count(Voice::Soprano, &[G4, B4, C5]), 0);
    }

    #[test]
    fn test_parallel_fifths() {
        // C-G moving to D-A in similar motion
        assert_eq!(voice_independence_check(&[G4, A4], &[C4, D4], false), 1);
        // oblique motion into the same fifth is fine
        assert_eq!(voice_independence_check(&[G4, G4], &[C4, C4], false), 0);
        // consecutive octaves count even in contrary motion
        assert_eq!(voice_independence_check(&[C4, D4], &[C3, D2], false), 1);
        // approaching an octave from a third by oblique motion
        assert_eq!(voice_independence_check(&[E4, C4], &[C3, C3], true), 0);
        // contrary motion into an octave between the outer voices is fine
        assert_eq!(voice_independence_check(&[G4, C5], &[E3, C3], true), 0);
        // hidden octave between the outer voices
        assert_eq!(voice_independence_check(&[A4, C5], &[F3, C4], true), 1);
        assert_eq!(voice_independence_check(&[A4, C5], &[F3, C4], false), 0);
    }

    #[test]
    fn test_outer_voice_positions() {
        let voicing = Voicing::satb();
        assert_eq!(improper_outer_voice_count(&[C5, G4, E4, C3], &voicing), 0);
        // alto above soprano
        assert_eq!(improper_outer_voice_count(&[G4, C5, E4, C3], &voicing), 1);
        // tenor below bass, alto above soprano
        assert_eq!(improper_outer_voice_count(&[G4, C5, C3, E3], &voicing), 2);
    }

    #[test]
    fn test_leading_tone_runs() {
        assert_eq!(unresolved_leading_tones(&[B3, C4]), 0);
        assert_eq!(unresolved_leading_tones(&[B3, A3]), 1);
        assert_eq!(unresolved_leading_tones(&[C4, B3]), 0);
        assert_eq!(unresolved_leading_tones(&[B3, B4, C5]), 0);
        assert_eq!(unresolved_leading_tones(&[B3, B4]), 1);
        assert_eq!(unresolved_leading_tones(&[B2, G2, B2, D3]), 2);
        assert_eq!(unresolved_leading_tones(&[]), 0);
    }

    #[test]
    fn test_seventh_resolution() {
        // G7 with F in the tenor falling to E
        let good = satb(&[&[B4, G4, F4, G2], &[C5, G4, E4, C3]]);
        assert_eq!(improper_seventh_resolution(&good), 0);
        // F rising to G
        let bad = satb(&[&[B4, D4, F3, G2], &[C5, E4, G3, C3]]);
        assert_eq!(improper_seventh_resolution(&bad), 1);
    }

    #[test]
    fn test_authentic_cadence() {
        // V - I, root in the soprano of the final chord
        let c = satb(&[&[B4, G4, D4, G2], &[C5, G4, E4, C3]]);
        assert_eq!(c.series(), "[TT]");
        assert_eq!(improper_cadential_form(&c), 0);
        assert_eq!(Rule::StartWithNonTriad.defects(&c), 0);
        assert_eq!(Rule::ImproperOuterVoices.defects(&c), 0);
    }

    #[test]
    fn test_cadence_without_formula() {
        // ii - I is not one of the cadence formulas
        let c = satb(&[&[A4, F4, D4, D3], &[C5, G4, E4, C3]]);
        assert_eq!(c.series(), "[TT]");
        assert_eq!(c.progression(), "[DC]");
        assert_eq!(improper_cadential_form(&c), 1);
    }

    #[test]
    fn test_single_slot_cadence() {
        let c = satb(&[&[C5, G4, E4, C3]]);
        // no penultimate chord and no formula; root is on top
        assert_eq!(improper_cadential_form(&c), 2);
    }

    #[test]
    fn test_dissonance_counts() {
        // E5 C5 D4 C3 is not a chord; G7 is a seventh
        let c = satb(&[&[E5, C5, D4, C3], &[B4, F4, D4, G2], &[C5, G4, E4, C3]]);
        assert_eq!(c.series(), "[XST]");
        assert_eq!(Rule::NotTriadOrSeventhChord.defects(&c), 1);
        assert_eq!(Rule::SuccessiveDissonantChords.defects(&c), 1);
        assert_eq!(Rule::StartWithNonTriad.defects(&c), 1);
    }

    #[test]
    fn test_names_and_weights() {
        assert_eq!(Rule::ALL.len(), 8);
        assert_eq!(Rule::ImproperOuterVoices.default_weight(), 0.25);
        assert_eq!(Rule::MelodicSmoothness.to_string(), "MelodicSmoothness");
    }
}
