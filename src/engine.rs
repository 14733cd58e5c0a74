use crate::config::Config;
use crate::error::SimError;
use crate::model::{HealthState, Population, StatsRecord};
use crate::params::ParameterSet;
use crate::population::create_population;
use crate::stats::compute_statistics;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use rmp_serde::encode;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Distance within which an infected individual can expose a healthy one.
pub const CONTACT_RADIUS: f64 = 6.0;

/// Summary of what a single round did.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// Quarantine was active during the exposure pass.
    pub quarantine_active: bool,
    /// Transmission probability used for every contact of the round.
    pub effective_infection_rate: f64,
    /// Number of healthy individuals that became exposed.
    pub new_exposures: usize,
}

/// Advance the population by one round.
///
/// The round runs the quarantine determination, the exposure pass over all
/// infected/healthy pairs, the commit of new exposures and the per-state
/// advance, in this order. Individuals exposed during this round are not
/// advanced until the next one, so they start it with zero exposed days.
///
/// # Errors
/// Returns [`SimError::InvalidParameter`] before touching the population if
/// `params` is invalid.
pub fn advance_round<R: Rng + ?Sized>(
    pop: &mut Population,
    params: &ParameterSet,
    rng: &mut R,
) -> Result<RoundReport, SimError> {
    params.validate()?;

    let n_ind = pop.len();
    if n_ind == 0 {
        return Ok(RoundReport {
            quarantine_active: false,
            effective_infection_rate: params.infection_rate,
            new_exposures: 0,
        });
    }

    // Quarantine is decided once, from the state at the start of the round.
    let frac_infected = pop.count(HealthState::Infected) as f64 / n_ind as f64;
    let quarantine_active = frac_infected >= params.quarantine_threshold;
    let effective_infection_rate = if quarantine_active {
        params.infection_rate * params.quarantine_reduction_factor
    } else {
        params.infection_rate
    };

    let exposed_now = expose_contacts(pop, quarantine_active, effective_infection_rate, rng)?;

    let mut new_exposures = 0;
    for (ind, &exposed) in pop.ind_vec_mut().iter_mut().zip(&exposed_now) {
        if exposed {
            ind.enter(HealthState::Exposed);
            ind.newly_exposed = true;
            new_exposures += 1;
        }
    }

    advance_states(pop, params, &exposed_now, rng)?;

    Ok(RoundReport {
        quarantine_active,
        effective_infection_rate,
        new_exposures,
    })
}

/// Flag infected individuals with the quarantine state and collect the
/// healthy individuals they expose, as a mask indexed by id.
fn expose_contacts<R: Rng + ?Sized>(
    pop: &mut Population,
    quarantine_active: bool,
    infection_rate: f64,
    rng: &mut R,
) -> Result<Vec<bool>, SimError> {
    let trans_dist = Bernoulli::new(infection_rate).map_err(|_| SimError::InvalidParameter {
        name: "infection_rate",
        value: infection_rate,
        reason: "effective probability must be in the range [0, 1]",
    })?;

    let mut i_inf_vec = Vec::new();
    let mut i_hea_vec = Vec::new();
    for (i_ind, ind) in pop.ind_vec_mut().iter_mut().enumerate() {
        match ind.state {
            HealthState::Infected => {
                ind.quarantined = quarantine_active;
                i_inf_vec.push(i_ind);
            }
            HealthState::Healthy => i_hea_vec.push(i_ind),
            HealthState::Exposed | HealthState::Recovered => {}
        }
    }

    let ind_vec = pop.ind_vec();
    let mut exposed_now = vec![false; ind_vec.len()];
    for &i_inf in &i_inf_vec {
        for &i_hea in &i_hea_vec {
            if ind_vec[i_inf].distance(&ind_vec[i_hea]) > CONTACT_RADIUS {
                continue;
            }
            // Every contact draws a trial, even if the individual is already exposed.
            if trans_dist.sample(rng) {
                exposed_now[i_hea] = true;
            }
        }
    }

    Ok(exposed_now)
}

fn advance_states<R: Rng + ?Sized>(
    pop: &mut Population,
    params: &ParameterSet,
    exposed_now: &[bool],
    rng: &mut R,
) -> Result<(), SimError> {
    let reinf_dist = Bernoulli::new(params.reinfection_probability).map_err(|_| {
        SimError::InvalidParameter {
            name: "reinfection_probability",
            value: params.reinfection_probability,
            reason: "probability must be in the range [0, 1]",
        }
    })?;

    for (ind, &exposed) in pop.ind_vec_mut().iter_mut().zip(exposed_now) {
        if exposed {
            continue;
        }
        match ind.state {
            HealthState::Healthy => {}
            HealthState::Exposed => {
                ind.newly_exposed = false;
                ind.days_exposed += 1;
                if ind.days_exposed >= params.incubation_time {
                    ind.enter(HealthState::Infected);
                    ind.newly_infected = true;
                }
            }
            HealthState::Infected => {
                ind.newly_infected = false;
                ind.days_infected += 1;
                if ind.days_infected >= params.recovery_time {
                    ind.enter(HealthState::Recovered);
                }
            }
            HealthState::Recovered => {
                if reinf_dist.sample(rng) {
                    ind.enter(HealthState::Healthy);
                }
            }
        }
    }

    Ok(())
}

/// Simulation engine.
///
/// Holds the configuration, current population, random number generator and
/// the statistics records of every round simulated so far.
pub struct Engine {
    cfg: Config,
    pop: Population,
    rng: ChaCha12Rng,
    round: usize,
    quarantine_active: bool,
    records: Vec<StatsRecord>,
}

impl Engine {
    /// Create a new `Engine` with the given configuration and a fresh population.
    pub fn generate_initial_condition(cfg: Config) -> Result<Self> {
        cfg.validate().context("failed to validate config")?;

        let mut rng = match cfg.init.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let pop = create_population(cfg.init.population_size, &mut rng)
            .context("failed to create population")?;

        let records = vec![compute_statistics(&pop, 0)];

        Ok(Self {
            cfg,
            pop,
            rng,
            round: 0,
            quarantine_active: false,
            records,
        })
    }

    pub fn population(&self) -> &Population {
        &self.pop
    }

    pub fn records(&self) -> &[StatsRecord] {
        &self.records
    }

    /// Quarantine was active during the last round.
    pub fn quarantine_active(&self) -> bool {
        self.quarantine_active
    }

    /// Reseed the individual `id` into `state` before the next round.
    pub fn set_state(&mut self, id: usize, state: HealthState) -> Result<(), SimError> {
        self.pop.set_state(id, state)
    }

    /// Perform the simulation and save the resulting records to a binary file.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let n_rounds = self.cfg.output.n_rounds;
        let rounds_per_log = self.cfg.output.rounds_per_log;
        for i_round in 0..n_rounds {
            self.perform_step().context("failed to perform step")?;

            if (i_round + 1) % rounds_per_log == 0 || i_round + 1 == n_rounds {
                let progress = 100.0 * (i_round + 1) as f64 / n_rounds as f64;
                log::info!("completed {progress:06.2}%");
            }
        }

        for record in &self.records {
            encode::write(&mut writer, record).context("failed to serialize record")?;
        }

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Advance one round and append its statistics record.
    pub fn perform_step(&mut self) -> Result<()> {
        let report = advance_round(&mut self.pop, &self.cfg.params, &mut self.rng)
            .context("failed to advance round")?;
        self.round += 1;
        log::trace!("round {}: {report:?}", self.round);

        if report.quarantine_active != self.quarantine_active {
            let change = if report.quarantine_active {
                "activated"
            } else {
                "lifted"
            };
            log::debug!("quarantine {change} at round {}", self.round);
            self.quarantine_active = report.quarantine_active;
        }

        self.records.push(compute_statistics(&self.pop, self.round));

        Ok(())
    }
}
