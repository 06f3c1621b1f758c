use crate::config::Config;
use crate::model::Record;
use crate::stats::{Accumulator, AccumulatorReport, RoundStats};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::Serialize;
use serde_value::Value;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

pub trait Obs {
    fn update(&mut self, record: &Record) -> Result<()>;
    fn report(&self) -> Result<Value>;
}

fn named_report<T: Serialize>(name: &str, report: T) -> Result<Value> {
    let report = serde_value::to_value(report).context("failed to convert report")?;
    let mut map = BTreeMap::new();
    map.insert(Value::String(name.to_string()), report);
    Ok(Value::Map(map))
}

/// Infected fraction and new infections per round.
pub struct InfectedCurve {
    pop_size: usize,
    frac_acc: Accumulator,
    new_acc: Accumulator,
    last: Option<RoundStats>,
}

#[derive(Debug, Serialize)]
pub struct InfectedCurveReport {
    pub n_rounds: usize,
    pub final_infected: usize,
    pub infected_fraction: AccumulatorReport,
    pub newly_infected: AccumulatorReport,
}

impl InfectedCurve {
    pub fn new(cfg: &Config) -> Self {
        Self {
            pop_size: cfg.init.pop_size,
            frac_acc: Accumulator::new(),
            new_acc: Accumulator::new(),
            last: None,
        }
    }
}

impl Obs for InfectedCurve {
    fn update(&mut self, record: &Record) -> Result<()> {
        let stats = record.stats;
        self.frac_acc.add(stats.infected as f64 / self.pop_size as f64);
        self.new_acc.add(stats.newly_infected as f64);
        self.last = Some(stats);
        Ok(())
    }

    fn report(&self) -> Result<Value> {
        let report = InfectedCurveReport {
            n_rounds: self.last.map_or(0, |stats| stats.round + 1),
            final_infected: self.last.map_or(0, |stats| stats.infected),
            infected_fraction: self.frac_acc.report(),
            newly_infected: self.new_acc.report(),
        };
        named_report("infected_curve", report)
    }
}

/// Round with the most new infections.
pub struct EpidemicPeak {
    peak: Option<RoundStats>,
}

#[derive(Debug, Serialize)]
pub struct EpidemicPeakReport {
    pub round: Option<usize>,
    pub newly_infected: usize,
}

impl EpidemicPeak {
    pub fn new() -> Self {
        Self { peak: None }
    }
}

impl Obs for EpidemicPeak {
    fn update(&mut self, record: &Record) -> Result<()> {
        let stats = record.stats;
        match self.peak {
            Some(peak) if peak.newly_infected >= stats.newly_infected => {}
            _ => self.peak = Some(stats),
        }
        Ok(())
    }

    fn report(&self) -> Result<Value> {
        let report = EpidemicPeakReport {
            round: self.peak.map(|stats| stats.round),
            newly_infected: self.peak.map_or(0, |stats| stats.newly_infected),
        };
        named_report("epidemic_peak", report)
    }
}

/// First round at which every agent is infected.
pub struct Saturation {
    pop_size: usize,
    round: Option<usize>,
}

impl Saturation {
    pub fn new(cfg: &Config) -> Self {
        Self {
            pop_size: cfg.init.pop_size,
            round: None,
        }
    }
}

impl Obs for Saturation {
    fn update(&mut self, record: &Record) -> Result<()> {
        if self.round.is_none() && record.stats.infected == self.pop_size {
            self.round = Some(record.stats.round);
        }
        Ok(())
    }

    fn report(&self) -> Result<Value> {
        named_report("saturation_round", self.round)
    }
}

pub struct Analyzer {
    cfg: Config,
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(cfg: Config) -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(InfectedCurve::new(&cfg)),
            Box::new(EpidemicPeak::new()),
            Box::new(Saturation::new(&cfg)),
        ];
        Self { cfg, obs_ptr_vec }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        for _ in 0..self.cfg.output.rounds_per_file {
            let record: Record = decode::from_read(&mut reader).context("failed to read record")?;
            self.add_record(&record)?;
        }
        Ok(())
    }

    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        for obs in &mut self.obs_ptr_vec {
            obs.update(record).context("failed to update observable")?;
        }
        Ok(())
    }

    pub fn reports(&self) -> Result<Vec<Value>> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let reports = self.reports().context("failed to collect reports")?;
        encode::write_named(&mut writer, &reports).context("failed to serialize reports")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_toml(
            r#"
[model]
infection_chance = 100.0

[init]
pop_size = 4

[output]
rounds_per_file = 4
rounds_per_snapshot = 4
"#,
        )
        .unwrap()
    }

    fn record(round: usize, infected: usize, newly_infected: usize) -> Record {
        Record {
            stats: RoundStats {
                round,
                infected,
                newly_infected,
            },
            state: None,
        }
    }

    fn field<'a>(report: &'a Value, name: &str) -> &'a Value {
        let Value::Map(map) = report else {
            panic!("report is not a map: {report:?}");
        };
        &map[&Value::String(name.to_string())]
    }

    #[test]
    fn reports_peak_and_saturation() {
        let mut analyzer = Analyzer::new(config());
        for rec in [record(0, 2, 1), record(1, 4, 2), record(2, 4, 0)] {
            analyzer.add_record(&rec).unwrap();
        }
        let reports = analyzer.reports().unwrap();
        assert_eq!(reports.len(), 3);

        let curve = field(&reports[0], "infected_curve");
        assert_eq!(field(curve, "final_infected"), &Value::U64(4));
        assert_eq!(field(curve, "n_rounds"), &Value::U64(3));

        let peak = field(&reports[1], "epidemic_peak");
        assert_eq!(field(peak, "round"), &Value::Option(Some(Box::new(Value::U64(1)))));
        assert_eq!(field(peak, "newly_infected"), &Value::U64(2));

        assert_eq!(
            field(&reports[2], "saturation_round"),
            &Value::Option(Some(Box::new(Value::U64(1))))
        );
    }

    #[test]
    fn empty_run_reports_nothing_reached() {
        let analyzer = Analyzer::new(config());
        let reports = analyzer.reports().unwrap();
        assert_eq!(field(&reports[2], "saturation_round"), &Value::Option(None));
        let peak = field(&reports[1], "epidemic_peak");
        assert_eq!(field(peak, "round"), &Value::Option(None));
    }
}
