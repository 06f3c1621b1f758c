use crate::contact::ContactKind;
use crate::shuffle::ShuffleMode;
use crate::update::ModelParams;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Disease model parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Rule deciding who meets whom each round.
    #[serde(default)]
    pub contact: ContactKind,
    /// Index draw used when shuffling for handshakes.
    #[serde(default)]
    pub shuffle: ShuffleMode,
    /// Percent chance of infection per exposure.
    #[serde(default = "default_infection_chance")]
    pub infection_chance: f64,
}

impl ModelConfig {
    /// Parameters handed to the update step.
    pub fn params(&self) -> ModelParams {
        ModelParams {
            infection_chance: self.infection_chance,
        }
    }
}

fn default_infection_chance() -> f64 {
    ModelParams::default().infection_chance
}

/// Initial condition parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Number of agents.
    pub pop_size: usize,
    /// Random seed. Drawn from the OS if absent.
    pub seed: Option<u64>,
}

/// Output parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of rounds written per trajectory file.
    pub rounds_per_file: usize,
    /// Number of rounds between population snapshots.
    pub rounds_per_snapshot: usize,
}

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub init: InitConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
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

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.model.infection_chance, 0.0..=100.0)
            .context("invalid infection chance")?;

        check_num(self.init.pop_size, 1..=1_000_000).context("invalid population size")?;

        check_num(self.output.rounds_per_file, 1..=100_000)
            .context("invalid number of rounds per file")?;
        check_num(self.output.rounds_per_snapshot, 1..=100_000)
            .context("invalid number of rounds per snapshot")?;

        Ok(())
    }
}

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
