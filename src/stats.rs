use crate::model::{HealthState, Population, StatsRecord};
use serde::{Deserialize, Serialize};

/// Count the individuals of `pop` by health state.
pub fn compute_statistics(pop: &Population, round: usize) -> StatsRecord {
    let mut record = StatsRecord {
        round,
        healthy: 0,
        exposed: 0,
        infected: 0,
        recovered: 0,
    };
    for ind in pop.iter() {
        match ind.state() {
            HealthState::Healthy => record.healthy += 1,
            HealthState::Exposed => record.exposed += 1,
            HealthState::Infected => record.infected += 1,
            HealthState::Recovered => record.recovered += 1,
        }
    }
    record
}

/// Running mean and sample variance (Welford's algorithm).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::create_population;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn counts_by_state() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let mut pop = create_population(9, &mut rng).unwrap();
        for id in 0..9 {
            pop.set_state(id, HealthState::Healthy).unwrap();
        }
        pop.set_state(0, HealthState::Exposed).unwrap();
        pop.set_state(1, HealthState::Infected).unwrap();
        pop.set_state(2, HealthState::Infected).unwrap();
        pop.set_state(8, HealthState::Recovered).unwrap();

        let record = compute_statistics(&pop, 12);

        assert_eq!(
            record,
            StatsRecord {
                round: 12,
                healthy: 5,
                exposed: 1,
                infected: 2,
                recovered: 1,
            }
        );
    }

    #[test]
    fn accumulator_mean_and_std_dev() {
        let mut acc = Accumulator::new();
        for val in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.add(val);
        }
        let report = acc.report();
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn accumulator_without_values() {
        let report = Accumulator::new().report();
        assert!(report.mean.is_nan());
        assert!(report.std_dev.is_nan());
    }
}
