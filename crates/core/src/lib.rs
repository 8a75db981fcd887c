//! Shared data model for the chime alarm suite.
//!
//! Everything here is what the host persists: alarms, their weekly
//! recurrence and repetition windows, and the app settings that travel with
//! them in the same JSON blob. Scheduling logic lives in `chime-alarms`.

pub mod alarm;
pub mod clock_time;
pub mod config;
pub mod error;
pub mod state;

pub use alarm::*;
pub use clock_time::parse_clock_time;
pub use config::Config;
pub use error::*;
pub use state::*;
