//! Core genome traits
//!
//! This module defines the `EvolutionaryGenome` trait that operators,
//! populations and the search loop are written against.

use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};

/// Core genome abstraction for evolutionary algorithms.
///
/// Genomes are immutable values: operators read one or two genomes and
/// produce new ones. They must be cloneable, serializable, and thread-safe
/// so that populations can be evaluated in parallel.
pub trait EvolutionaryGenome: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Shape information needed to generate a random genome
    type Layout: Clone + Send + Sync;

    /// Generate a random genome with the given layout
    fn generate<R: Rng>(rng: &mut R, layout: &Self::Layout) -> Self;
}
