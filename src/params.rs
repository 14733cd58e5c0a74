use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the epidemic engine.
///
/// Passed by reference into every round; the engine never keeps a copy.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Base per-contact transmission probability.
    pub infection_rate: f64,
    /// Rounds spent exposed before becoming infected.
    pub incubation_time: u32,
    /// Rounds spent infected before becoming recovered.
    pub recovery_time: u32,
    /// Per-round probability that a recovered individual becomes healthy again.
    pub reinfection_probability: f64,
    /// Fraction of the population that must be infected to activate quarantine.
    pub quarantine_threshold: f64,
    /// Multiplier applied to the infection rate while quarantine is active.
    pub quarantine_reduction_factor: f64,
}

impl ParameterSet {
    /// Check that probabilities lie in `[0, 1]` and times are positive.
    pub fn validate(&self) -> Result<(), SimError> {
        check_prob("infection_rate", self.infection_rate)?;
        check_time("incubation_time", self.incubation_time)?;
        check_time("recovery_time", self.recovery_time)?;
        check_prob("reinfection_probability", self.reinfection_probability)?;
        check_prob("quarantine_threshold", self.quarantine_threshold)?;
        check_prob(
            "quarantine_reduction_factor",
            self.quarantine_reduction_factor,
        )?;
        Ok(())
    }
}

fn check_prob(name: &'static str, value: f64) -> Result<(), SimError> {
    // NaN is rejected as well since it is not contained in any range.
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::InvalidParameter {
            name,
            value,
            reason: "probability must be in the range [0, 1]",
        });
    }
    Ok(())
}

fn check_time(name: &'static str, value: u32) -> Result<(), SimError> {
    if value == 0 {
        return Err(SimError::InvalidParameter {
            name,
            value: value as f64,
            reason: "time must be a positive number of rounds",
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_params() -> ParameterSet {
    ParameterSet {
        infection_rate: 0.5,
        incubation_time: 2,
        recovery_time: 3,
        reinfection_probability: 0.0,
        quarantine_threshold: 1.0,
        quarantine_reduction_factor: 1.0,
    }
}
