//! Simulation data types.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Health state of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Exposed,
    Infected,
    Recovered,
}

/// Individual of the simulation.
///
/// The position is fixed at creation. The remaining fields are owned by the
/// engine and only change through a state entry or a round.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    id: usize,
    x: f64,
    y: f64,

    pub(crate) state: HealthState,
    pub(crate) days_exposed: u32,
    pub(crate) days_infected: u32,
    pub(crate) quarantined: bool,

    pub(crate) newly_exposed: bool,
    pub(crate) newly_infected: bool,
}

impl Individual {
    /// Create a new healthy individual at a given position.
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            state: HealthState::Healthy,
            days_exposed: 0,
            days_infected: 0,
            quarantined: false,
            newly_exposed: false,
            newly_infected: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn days_exposed(&self) -> u32 {
        self.days_exposed
    }

    pub fn days_infected(&self) -> u32 {
        self.days_infected
    }

    pub fn quarantined(&self) -> bool {
        self.quarantined
    }

    /// Became exposed during the last round. Display only.
    pub fn newly_exposed(&self) -> bool {
        self.newly_exposed
    }

    /// Became infected during the last round. Display only.
    pub fn newly_infected(&self) -> bool {
        self.newly_infected
    }

    /// Euclidean distance between the positions of two individuals.
    pub fn distance(&self, other: &Individual) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Enter `state` with counters and markers reset.
    pub(crate) fn enter(&mut self, state: HealthState) {
        self.state = state;
        self.days_exposed = 0;
        self.days_infected = 0;
        self.quarantined = false;
        self.newly_exposed = false;
        self.newly_infected = false;
    }
}

/// Population of the simulation.
///
/// Individuals are stored in creation order and addressed by id, which is
/// also their index. The length never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    ind_vec: Vec<Individual>,
}

impl Population {
    pub(crate) fn new(ind_vec: Vec<Individual>) -> Self {
        Self { ind_vec }
    }

    pub fn len(&self) -> usize {
        self.ind_vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ind_vec.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Individual> {
        self.ind_vec.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.ind_vec.iter()
    }

    pub(crate) fn ind_vec(&self) -> &[Individual] {
        &self.ind_vec
    }

    pub(crate) fn ind_vec_mut(&mut self) -> &mut [Individual] {
        &mut self.ind_vec
    }

    /// Number of individuals currently in `state`.
    pub fn count(&self, state: HealthState) -> usize {
        self.ind_vec.iter().filter(|ind| ind.state == state).count()
    }

    /// Reseed the individual `id` into `state`.
    ///
    /// Counters and markers are reset as on any state entry.
    pub fn set_state(&mut self, id: usize, state: HealthState) -> Result<(), SimError> {
        let len = self.ind_vec.len();
        let ind = self
            .ind_vec
            .get_mut(id)
            .ok_or(SimError::UnknownIndividual { id, len })?;
        ind.enter(state);
        Ok(())
    }
}

/// Record of the simulation at a single round.
///
/// Counts of individuals per health state; they always sum to the population size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub round: usize,
    pub healthy: usize,
    pub exposed: usize,
    pub infected: usize,
    pub recovered: usize,
}

impl StatsRecord {
    /// Population size.
    pub fn total(&self) -> usize {
        self.healthy + self.exposed + self.infected + self.recovered
    }

    pub fn count(&self, state: HealthState) -> usize {
        match state {
            HealthState::Healthy => self.healthy,
            HealthState::Exposed => self.exposed,
            HealthState::Infected => self.infected,
            HealthState::Recovered => self.recovered,
        }
    }

    /// Fraction of the population in `state`, NaN for an empty population.
    pub fn fraction(&self, state: HealthState) -> f64 {
        let total = self.total();
        if total == 0 {
            return f64::NAN;
        }
        self.count(state) as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_population(len: usize) -> Population {
        Population::new((0..len).map(|id| Individual::new(id, id as f64, 0.0)).collect())
    }

    #[test]
    fn set_state_resets_counters() {
        let mut pop = line_population(3);
        pop.ind_vec[1].state = HealthState::Infected;
        pop.ind_vec[1].days_infected = 4;
        pop.ind_vec[1].quarantined = true;
        pop.ind_vec[1].newly_infected = true;

        pop.set_state(1, HealthState::Exposed).unwrap();

        let ind = pop.get(1).unwrap();
        assert_eq!(ind.state(), HealthState::Exposed);
        assert_eq!(ind.days_exposed(), 0);
        assert_eq!(ind.days_infected(), 0);
        assert!(!ind.quarantined());
        assert!(!ind.newly_infected());
    }

    #[test]
    fn set_state_rejects_unknown_id() {
        let mut pop = line_population(2);
        assert_eq!(
            pop.set_state(2, HealthState::Infected),
            Err(SimError::UnknownIndividual { id: 2, len: 2 })
        );
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Individual::new(0, 0.0, 0.0);
        let b = Individual::new(1, 3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn record_fractions() {
        let record = StatsRecord {
            round: 3,
            healthy: 2,
            exposed: 1,
            infected: 1,
            recovered: 0,
        };
        assert_eq!(record.total(), 4);
        assert_eq!(record.fraction(HealthState::Healthy), 0.5);
        assert_eq!(record.fraction(HealthState::Recovered), 0.0);
    }
}
