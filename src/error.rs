//! Error kinds of the simulation core.

use thiserror::Error;

/// Errors reported by the population factory and the epidemic engine.
///
/// All of them are configuration or programming errors: they are returned
/// to the caller as soon as they are detected and never retried.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("population size must be a positive perfect square, but is {size}")]
    InvalidSize { size: usize },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("no individual with id {id} in a population of {len}")]
    UnknownIndividual { id: usize, len: usize },
}
