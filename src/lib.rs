//! Toy agent-based model of disease spread.
//!
//! Agents on a square grid meet in pairs each round and pass on an infection
//! with a fixed percentage chance. The core pieces are
//! [`population::create_population`], [`shuffle::shuffle_population`],
//! [`update::update_population`] and [`stats::compute_statistics`]; the
//! [`engine`] and [`manager`] modules drive runs from a simulation directory.

pub mod analysis;
pub mod config;
pub mod contact;
pub mod engine;
pub mod manager;
pub mod model;
pub mod population;
pub mod shuffle;
pub mod stats;
pub mod update;
