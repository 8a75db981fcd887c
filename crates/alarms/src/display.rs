//! Formatting helpers for alarm lists and cards.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use chime_core::{Alarm, HourFormat, RepetitionWindow, Weekday};

use crate::predictor::predict_next;

pub fn format_time_short(time: NaiveTime, format: HourFormat) -> String {
    match format {
        HourFormat::H24 => time.format("%H:%M").to_string(),
        HourFormat::H12 => time.format("%I:%M %p").to_string(),
    }
}

pub fn format_time(time: NaiveTime, format: HourFormat) -> String {
    match format {
        HourFormat::H24 => time.format("%H:%M:%S").to_string(),
        HourFormat::H12 => time.format("%I:%M:%S %p").to_string(),
    }
}

/// The time shown on an alarm card: the next predicted ring, or the
/// configured `hour:minute` when nothing is predicted.
pub fn next_label(alarm: &Alarm, from: NaiveDateTime, format: HourFormat) -> String {
    match predict_next(alarm, from) {
        Some(next) => format_time_short(next.time(), format),
        None => alarm
            .daily_time()
            .map(|t| format_time_short(t, format))
            .unwrap_or_else(|_| "--:--".to_string()),
    }
}

/// Monday-first initials, selected days upper-case: `"MtWtfss"`.
pub fn weekday_initials(alarm: &Alarm) -> String {
    Weekday::ALL
        .iter()
        .map(|day| {
            let initial = day.as_str().chars().next().unwrap_or('?');
            if alarm.rings_on(*day) {
                initial.to_ascii_uppercase()
            } else {
                initial
            }
        })
        .collect()
}

/// Compact duration for interval labels: `"1h 5m"`, `"30s"`, `"250ms"`.
pub fn format_duration(duration: TimeDelta) -> String {
    let ms = duration.num_milliseconds();
    if ms <= 0 {
        return "0s".to_string();
    }
    if ms < 1_000 {
        return format!("{ms}ms");
    }

    let secs = ms / 1_000;
    let parts: Vec<String> = [(secs / 3_600, "h"), (secs / 60 % 60, "m"), (secs % 60, "s")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect();
    parts.join(" ")
}

/// `"22:00-02:00 every 15m"`, or the raw fields if the window is malformed.
pub fn window_label(window: &RepetitionWindow, format: HourFormat) -> String {
    match window.resolve() {
        Ok(w) => format!(
            "{}-{} every {}",
            format_time_short(w.start, format),
            format_time_short(w.end, format),
            format_duration(w.interval)
        ),
        Err(_) => format!(
            "{}-{} every {}ms (invalid)",
            window.start_time, window.end_time, window.interval_ms
        ),
    }
}
