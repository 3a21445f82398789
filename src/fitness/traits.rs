//! Fitness traits
//!
//! This module defines the fitness evaluation traits.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::genome::traits::EvolutionaryGenome;

/// Trait bound for fitness values
///
/// Fitness values must be comparable and convertible to f64 for
/// reporting. They must also be serializable so results can be saved.
pub trait FitnessValue:
    PartialOrd + Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    /// Convert fitness to f64
    fn to_f64(&self) -> f64;
}

impl FitnessValue for f64 {
    fn to_f64(&self) -> f64 {
        *self
    }
}

/// Fitness evaluation trait
///
/// Defines how to evaluate the fitness of a genome. Evaluation must be a
/// pure function of the genome.
#[cfg(feature = "parallel")]
pub trait Fitness: Send + Sync {
    /// The genome type being evaluated
    type Genome: EvolutionaryGenome;

    /// The fitness value type
    type Value: FitnessValue;

    /// Evaluate fitness (higher = better by convention)
    fn evaluate(&self, genome: &Self::Genome) -> Self::Value;
}

/// Fitness evaluation trait (non-parallel version)
///
/// Defines how to evaluate the fitness of a genome. Evaluation must be a
/// pure function of the genome.
#[cfg(not(feature = "parallel"))]
pub trait Fitness {
    /// The genome type being evaluated
    type Genome: EvolutionaryGenome;

    /// The fitness value type
    type Value: FitnessValue;

    /// Evaluate fitness (higher = better by convention)
    fn evaluate(&self, genome: &Self::Genome) -> Self::Value;
}
