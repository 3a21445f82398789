//! Genome abstractions and implementations
//!
//! This module provides the core `EvolutionaryGenome` trait and the
//! voice-leading `Candidate` genome.

pub mod candidate;
pub mod traits;

pub mod prelude {
    pub use super::candidate::*;
    pub use super::traits::*;
}
