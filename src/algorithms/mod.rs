//! Evolutionary algorithms
//!
//! This module provides the voice-leading genetic algorithm.

pub mod voice_leading_ga;

pub mod prelude {
    pub use super::voice_leading_ga::*;
}
