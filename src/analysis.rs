use crate::config::Config;
use crate::model::{HealthState, StatsRecord};
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

const STATES: [HealthState; 4] = [
    HealthState::Healthy,
    HealthState::Exposed,
    HealthState::Infected,
    HealthState::Recovered,
];

pub trait Obs {
    fn update(&mut self, record: &StatsRecord) -> Result<()>;
    fn report(&self) -> serde_json::Value;
}

/// Largest number of infected individuals and the first round reaching it.
pub struct PeakInfected {
    peak: Option<(usize, usize)>,
}

impl PeakInfected {
    pub fn new() -> Self {
        Self { peak: None }
    }
}

impl Obs for PeakInfected {
    fn update(&mut self, record: &StatsRecord) -> Result<()> {
        match self.peak {
            Some((_, infected)) if infected >= record.infected => {}
            _ => self.peak = Some((record.round, record.infected)),
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        let (round, infected) = match self.peak {
            Some((round, infected)) => (Some(round), Some(infected)),
            None => (None, None),
        };
        serde_json::json!({ "peak_infected": { "round": round, "infected": infected } })
    }
}

/// Mean and standard deviation of the fraction of each state.
pub struct StateFractions {
    acc_vec: Vec<Accumulator>,
}

impl StateFractions {
    pub fn new() -> Self {
        let mut acc_vec = Vec::new();
        acc_vec.resize_with(STATES.len(), Accumulator::new);
        Self { acc_vec }
    }
}

impl Obs for StateFractions {
    fn update(&mut self, record: &StatsRecord) -> Result<()> {
        if record.total() == 0 {
            return Ok(());
        }
        for (acc, &state) in self.acc_vec.iter_mut().zip(&STATES) {
            acc.add(record.fraction(state));
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        let reports: Vec<_> = self.acc_vec.iter().map(|acc| acc.report()).collect();
        serde_json::json!({ "state_fractions": reports })
    }
}

/// Number of rounds run with quarantine active.
///
/// A record holds the state at the start of the following round, which is
/// what the engine uses to decide on quarantine, so the last record is not
/// counted.
pub struct QuarantineRounds {
    threshold: f64,
    n_rounds: usize,
    pending: bool,
}

impl QuarantineRounds {
    pub fn new(cfg: &Config) -> Self {
        Self {
            threshold: cfg.params.quarantine_threshold,
            n_rounds: 0,
            pending: false,
        }
    }
}

impl Obs for QuarantineRounds {
    fn update(&mut self, record: &StatsRecord) -> Result<()> {
        if self.pending {
            self.n_rounds += 1;
        }
        self.pending = record.total() > 0 && record.fraction(HealthState::Infected) >= self.threshold;
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "quarantine_rounds": self.n_rounds })
    }
}

/// First round without exposed or infected individuals.
pub struct EpidemicEnd {
    round: Option<usize>,
}

impl EpidemicEnd {
    pub fn new() -> Self {
        Self { round: None }
    }
}

impl Obs for EpidemicEnd {
    fn update(&mut self, record: &StatsRecord) -> Result<()> {
        if self.round.is_none() && record.exposed + record.infected == 0 {
            self.round = Some(record.round);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "epidemic_end": self.round })
    }
}

/// Counts of the last record.
pub struct FinalCounts {
    last: Option<StatsRecord>,
}

impl FinalCounts {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Obs for FinalCounts {
    fn update(&mut self, record: &StatsRecord) -> Result<()> {
        self.last = Some(record.clone());
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "final_counts": self.last })
    }
}

pub struct Analyzer {
    cfg: Config,
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(cfg: Config) -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(PeakInfected::new()),
            Box::new(StateFractions::new()),
            Box::new(QuarantineRounds::new(&cfg)),
            Box::new(EpidemicEnd::new()),
            Box::new(FinalCounts::new()),
        ];
        Self { cfg, obs_ptr_vec }
    }

    pub fn add_record(&mut self, record: &StatsRecord) -> Result<()> {
        for obs in &mut self.obs_ptr_vec {
            obs.update(record).context("failed to update observable")?;
        }
        Ok(())
    }

    /// Read the records of a run, round 0 included.
    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        for _ in 0..=self.cfg.output.n_rounds {
            let record: StatsRecord =
                decode::from_read(&mut reader).context("failed to read record")?;
            self.add_record(&record)?;
        }
        Ok(())
    }

    pub fn reports(&self) -> Vec<serde_json::Value> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &self.reports())
            .context("failed to serialize results")?;
        Ok(())
    }
}
