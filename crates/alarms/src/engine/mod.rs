//! The polling loop that turns evaluations into rings.
//!
//! Split into focused submodules:
//! - `config`: poll cadence and tolerances
//! - `core`: `AlarmEngine` struct, start/stop lifecycle, accessors
//! - `pass`: one evaluation pass over the alarm list
//! - `stats`: counters exposed to hosts

mod config;
mod core;
mod pass;
mod stats;
#[cfg(test)]
mod tests;

pub use self::config::EngineConfig;
pub use self::core::{AlarmEngine, EngineError};
pub use self::pass::PassReport;
pub use self::stats::EngineStats;
