use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why an alarm's schedule can never produce a trigger.
///
/// These are not surfaced to the user at fire time; the evaluator treats
/// them as "never fires". They exist so diagnostics (and logs) can say why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("repetition window has no start time")]
    MissingStart,

    #[error("repetition window has no end time")]
    MissingEnd,

    #[error("repetition interval must be positive, got {0} ms")]
    NonPositiveInterval(i64),

    #[error("invalid wall-clock time {0:?}")]
    InvalidTime(String),

    #[error("invalid alarm time {hour:02}:{minute:02}")]
    InvalidDailyTime { hour: u8, minute: u8 },
}
