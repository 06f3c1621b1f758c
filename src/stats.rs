use crate::model::Agent;
use serde::{Deserialize, Serialize};

/// Statistics of a single round.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: usize,
    pub infected: usize,
    pub newly_infected: usize,
}

/// Count infected and newly infected agents.
///
/// `round` is supplied by the caller, usually the length of its history.
pub fn compute_statistics(agt_vec: &[Agent], round: usize) -> RoundStats {
    let mut infected = 0;
    let mut newly_infected = 0;
    for agt in agt_vec {
        if agt.infected {
            infected += 1;
        }
        if agt.newly_infected {
            newly_infected += 1;
        }
    }
    RoundStats {
        round,
        infected,
        newly_infected,
    }
}

pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Serialize, Deserialize)]
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
