use std::collections::BTreeSet;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::clock_time::parse_clock_time;
use crate::error::ScheduleError;

/// Day of the week as stored in the persisted blob (`"mon"` … `"sun"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repeating "burst" configuration, exactly as the host stores it.
///
/// Nothing is validated on load; a half-filled window deserializes fine and is
/// rejected by [`resolve`](RepetitionWindow::resolve) when the alarm is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepetitionWindow {
    pub enabled: bool,
    /// Spacing between triggers, in milliseconds.
    pub interval_ms: i64,
    /// Window start, `"HH:MM"`.
    pub start_time: String,
    /// Window end, `"HH:MM"`. May be earlier than `start_time` (crosses midnight).
    pub end_time: String,
}

/// A validated repetition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Always strictly positive.
    pub interval: TimeDelta,
}

impl BurstWindow {
    /// Whether the window wraps past midnight (e.g. 22:00 → 02:00).
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval.num_milliseconds()
    }
}

impl RepetitionWindow {
    pub fn resolve(&self) -> Result<BurstWindow, ScheduleError> {
        if self.start_time.trim().is_empty() {
            return Err(ScheduleError::MissingStart);
        }
        if self.end_time.trim().is_empty() {
            return Err(ScheduleError::MissingEnd);
        }
        if self.interval_ms <= 0 {
            return Err(ScheduleError::NonPositiveInterval(self.interval_ms));
        }

        Ok(BurstWindow {
            start: parse_clock_time(&self.start_time)?,
            end: parse_clock_time(&self.end_time)?,
            interval: TimeDelta::milliseconds(self.interval_ms),
        })
    }
}

/// How an alarm decides when to ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Once per selected day at a fixed time.
    Daily(NaiveTime),
    /// Repeatedly inside a window on each selected day.
    Burst(BurstWindow),
}

/// A configured alarm. Owned by the host; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 0-23. Ignored while a repetition window is enabled.
    pub hour: u8,
    /// 0-59. Ignored while a repetition window is enabled.
    pub minute: u8,
    pub active: bool,
    /// Days the alarm may ring on. Empty means never.
    #[serde(default)]
    pub weekdays: BTreeSet<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_window: Option<RepetitionWindow>,
    /// Creation time, Unix epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

impl Alarm {
    /// A single-fire alarm with no weekdays selected.
    pub fn new(id: impl Into<String>, hour: u8, minute: u8) -> Self {
        Self {
            id: id.into(),
            label: None,
            hour,
            minute,
            active: true,
            weekdays: BTreeSet::new(),
            repetition_window: None,
            created_at: 0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_weekdays(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.weekdays = days.into_iter().collect();
        self
    }

    pub fn with_repetition(mut self, window: RepetitionWindow) -> Self {
        self.repetition_window = Some(window);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// The enabled repetition window, if any.
    pub fn burst_window(&self) -> Option<&RepetitionWindow> {
        self.repetition_window.as_ref().filter(|w| w.enabled)
    }

    pub fn rings_on(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }

    /// The configured `hour:minute` as a time of day.
    pub fn daily_time(&self) -> Result<NaiveTime, ScheduleError> {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0).ok_or(
            ScheduleError::InvalidDailyTime {
                hour: self.hour,
                minute: self.minute,
            },
        )
    }

    pub fn trigger_mode(&self) -> Result<TriggerMode, ScheduleError> {
        match self.burst_window() {
            Some(window) => window.resolve().map(TriggerMode::Burst),
            None => self.daily_time().map(TriggerMode::Daily),
        }
    }

    /// Display name: the label, or the id when unlabeled.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().filter(|l| !l.is_empty()).unwrap_or(self.id.as_str())
    }
}
