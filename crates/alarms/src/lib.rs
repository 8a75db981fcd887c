//! Alarm scheduling engine.
//!
//! This crate provides:
//! - A pure trigger evaluator deciding whether an alarm rings at a given instant
//!   (weekday filter, single daily fire, repeating burst windows)
//! - A per-alarm occurrence cache so each qualifying instant rings exactly once
//! - A next-occurrence predictor for display
//! - [`AlarmEngine`], a polling loop that wires the above to host-supplied
//!   alarm sources, notifiers and clocks

pub mod clock;
pub mod display;
pub mod engine;
pub mod evaluator;
pub mod notifier;
pub mod occurrence;
pub mod predictor;
pub mod source;

pub use clock::{Clock, FixedClock, LocalClock};
pub use engine::{AlarmEngine, EngineConfig, EngineError, EngineStats, PassReport};
pub use evaluator::{evaluate, Decision, SkipReason, Tolerances};
pub use notifier::{AlarmNotifier, FnNotifier, NotifyError, RingingNotifier};
pub use occurrence::{Occurrence, OccurrenceCache};
pub use predictor::{predict_all, predict_next, soonest, PREDICTION_HORIZON_DAYS};
pub use source::{AlarmSource, FileAlarmSource, SharedAlarms, SourceError};
