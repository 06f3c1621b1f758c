use crate::config::Config;
use crate::contact::ContactRule;
use crate::model::{Record, State};
use crate::population::create_population;
use crate::stats::{RoundStats, compute_statistics};
use crate::update::update_population;
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Simulation engine.
///
/// Holds the configuration, current state, and random number generator,
/// and provides methods to initialize, run, save, and load simulations.
#[derive(Serialize, Deserialize)]
pub struct Engine {
    cfg: Config,
    state: State,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with the given configuration and a fresh population.
    pub fn generate_initial_condition(cfg: Config) -> Result<Self> {
        let mut rng = match cfg.init.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let agt_vec = create_population(cfg.init.pop_size, &mut rng);
        if let Some(zero) = agt_vec.iter().find(|agt| agt.infected) {
            log::info!("patient zero is agent {}", zero.id);
        }

        let state = State { round: 0, agt_vec };

        Ok(Self { cfg, state, rng })
    }

    /// Perform the simulation and save the resulting records to a binary file.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let rule = self.cfg.model.contact.build(self.cfg.model.shuffle);

        let rounds_per_file = self.cfg.output.rounds_per_file;
        for i_round in 0..rounds_per_file {
            let stats = self
                .perform_round(rule.as_ref())
                .context("failed to perform round")?;
            log::debug!("{stats:?}");

            let state = (stats.round % self.cfg.output.rounds_per_snapshot == 0)
                .then(|| self.state.clone());
            let record = Record { stats, state };

            encode::write(&mut writer, &record).context("failed to serialize record")?;

            if record.state.is_some() || i_round + 1 == rounds_per_file {
                let progress = 100.0 * (i_round + 1) as f64 / rounds_per_file as f64;
                log::info!("completed {progress:06.2}%");
            }
        }

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Save a checkpoint of the entire engine state.
    ///
    /// Can be used to resume the simulation later.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, &self).context("failed to serialize engine")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    /// Load a previously saved engine checkpoint.
    pub fn load_checkpoint<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let engine = decode::from_read(&mut reader).context("failed to deserialize engine")?;
        Ok(engine)
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Advance one round and return its statistics.
    pub fn perform_round(&mut self, rule: &dyn ContactRule) -> Result<RoundStats> {
        let params = self.cfg.model.params();

        update_population(&mut self.state.agt_vec, rule, &params, &mut self.rng)
            .context("failed to update population")?;

        let stats = compute_statistics(&self.state.agt_vec, self.state.round);
        self.state.round += 1;

        Ok(stats)
    }
}
