use crate::params::ParameterSet;
use crate::population::grid_side;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engine parameters.
    pub params: ParameterSet,
    /// Initial condition.
    pub init: InitConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// Number of individuals, a perfect square.
    pub population_size: usize,
    /// Seed of the random number generator. Drawn from the OS if absent.
    pub seed: Option<u64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of rounds simulated per run.
    pub n_rounds: usize,
    /// Number of rounds between progress messages.
    pub rounds_per_log: usize,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.params.validate().context("invalid engine parameters")?;

        let size = self.init.population_size;
        check_num(size, 1..1_000_000).context("invalid population size")?;
        if grid_side(size).is_none() {
            bail!("population size must be a perfect square, but is {size}");
        }

        check_num(self.output.n_rounds, 1..1_000_000).context("invalid number of rounds")?;
        check_num(self.output.rounds_per_log, 1..1_000_000)
            .context("invalid number of rounds per log")?;

        Ok(())
    }
}

/// Check that `num` lies in `range`.
fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[params]
infection_rate = 0.4
incubation_time = 3
recovery_time = 7
reinfection_probability = 0.01
quarantine_threshold = 0.1
quarantine_reduction_factor = 0.25

[init]
population_size = 400
seed = 42

[output]
n_rounds = 200
rounds_per_log = 50
"#;

    #[test]
    fn parses_valid_config() {
        let cfg = Config::from_toml(CONFIG).unwrap();
        assert_eq!(cfg.params.incubation_time, 3);
        assert_eq!(cfg.params.quarantine_reduction_factor, 0.25);
        assert_eq!(cfg.init.population_size, 400);
        assert_eq!(cfg.init.seed, Some(42));
        assert_eq!(cfg.output.n_rounds, 200);
    }

    #[test]
    fn seed_is_optional() {
        let contents = CONFIG.replace("seed = 42\n", "");
        let cfg = Config::from_toml(&contents).unwrap();
        assert_eq!(cfg.init.seed, None);
    }

    #[test]
    fn rejects_non_square_size() {
        let contents = CONFIG.replace("population_size = 400", "population_size = 401");
        let error = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{error:#}").contains("perfect square"));
    }

    #[test]
    fn rejects_invalid_probability() {
        let contents = CONFIG.replace("infection_rate = 0.4", "infection_rate = 1.4");
        let error = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{error:#}").contains("infection_rate"));
    }

    #[test]
    fn rejects_zero_rounds_per_log() {
        let contents = CONFIG.replace("rounds_per_log = 50", "rounds_per_log = 0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let contents = CONFIG.replace("[init]", "[init]\ncontact_radius = 6.0");
        assert!(Config::from_toml(&contents).is_err());
    }
}
