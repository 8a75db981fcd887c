use chrono::NaiveDateTime;
use serde::Serialize;

/// Engine counters since construction. Survive stop/start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Passes that evaluated alarms (source failures excluded).
    pub passes: u64,
    /// Occurrences admitted by the cache and handed to the notifier.
    pub fires: u64,
    /// Notifier calls that returned an error or panicked.
    pub notify_failures: u64,
    /// Passes abandoned because the alarm list could not be read.
    pub source_failures: u64,
    /// Wall-clock instant of the last completed evaluation.
    pub last_pass_at: Option<NaiveDateTime>,
}
