//! Fitness evaluation
//!
//! This module provides the fitness abstraction and the weighted
//! voice-leading rules that make up the fitness landscape.

pub mod cadence;
pub mod rule_set;
pub mod rules;
pub mod traits;

pub mod prelude {
    pub use super::cadence::*;
    pub use super::rule_set::*;
    pub use super::rules::*;
    pub use super::traits::*;
}
