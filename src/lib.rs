//! # voice-leading-evo
//!
//! Evolutionary search for four-part voice-leading progressions.
//!
//! A candidate is a fixed number of chords, one pitch per voice per chord,
//! drawn from a diatonic gamut. Candidates are scored by a weighted set of
//! common-practice voice-leading rules and evolved by an elitist generational
//! genetic algorithm with chord-aware crossover and mutation.
//!
//! ## Core Concepts
//!
//! - **Candidate**: flattened chord-major genome with memoised harmonic views
//!   (`progression`, `series`, roman numerals)
//! - **Rule set**: `1 − Σ weight × defects` over the active rules
//! - **Operators**: chord crossover blended with uniform crossover, and a
//!   mutation that only draws singable replacements
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voice_leading_evo::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let result = VoiceLeadingGA::builder()
//!     .voicing("SATB")
//!     .chord_count(4)
//!     .population_size(50)
//!     .elitism_rate(0.2)
//!     .max_generations(200)
//!     .fitness_target(0.98)
//!     .build()?
//!     .run(&mut rng)?;
//!
//! println!("{}", result.best_genome);
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod pitch;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::pitch::{ChordQuality, ChordSymbol, Pitch, Register, Step, Voice, Voicing};
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
