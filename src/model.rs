//! Simulation data types.

use crate::stats::RoundStats;
use serde::{Deserialize, Serialize};

/// Agent of the simulation.
///
/// Each agent has a stable `id`, a position on the `[0, 100] x [0, 100]` board
/// and its infection status.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub infected: bool,
    /// Infected during the current round only.
    pub newly_infected: bool,
}

impl Agent {
    /// Create a new healthy agent at the given position.
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            infected: false,
            newly_infected: false,
        }
    }

    /// Mark the agent as infected during the current round.
    ///
    /// Returns `false` if the agent was already infected.
    pub fn infect(&mut self) -> bool {
        if self.infected {
            return false;
        }
        self.infected = true;
        self.newly_infected = true;
        true
    }
}

/// State of the simulation after a given number of rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    /// Number of rounds performed so far.
    pub round: usize,

    /// Vector of agents, in creation order.
    pub agt_vec: Vec<Agent>,
}

/// Record of the simulation at a single round.
///
/// Contains the round statistics and state (optional).
#[derive(Serialize, Deserialize)]
pub struct Record {
    pub stats: RoundStats,

    pub state: Option<State>,
}
