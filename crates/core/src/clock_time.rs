//! Parsing of the `"HH:MM"` wall-clock strings stored in repetition windows.

use chrono::NaiveTime;

use crate::error::ScheduleError;

/// Parse a wall-clock time of day.
///
/// Accepts `"H"`, `"HH"`, `"H:M"` and `"HH:MM"` with surrounding whitespace.
/// A missing minute part means `:00`. Seconds are not accepted.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(s.to_string());

    let trimmed = s.trim();
    let (hour, minute) = match trimmed.split_once(':') {
        Some((h, m)) => (h, m),
        None => (trimmed, "0"),
    };

    let hour: u32 = parse_field(hour).ok_or_else(invalid)?;
    let minute: u32 = parse_field(minute).ok_or_else(invalid)?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

fn parse_field(field: &str) -> Option<u32> {
    let field = field.trim();
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
