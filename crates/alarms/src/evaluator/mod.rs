//! Trigger evaluation: does this alarm ring at this instant?
//!
//! Evaluation is pure. It looks at the alarm and a timezone-naive wall-clock
//! instant and returns a [`Decision`]; it never touches de-duplication state
//! and never performs side effects. [`OccurrenceCache`](crate::OccurrenceCache)
//! layers the "exactly once per occurrence" guarantee on top.
//!
//! Two trigger modes:
//! - **Daily**: ring within ± `single_fire` tolerance of `hour:minute`.
//! - **Burst**: ring within ± `burst` tolerance of each interval multiple
//!   measured from the window start, while inside `[start, end]`.

mod window;


use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use chime_core::config::SchedulerSettings;
use chime_core::{Alarm, BurstWindow, ScheduleError, TriggerMode};

use crate::occurrence::Occurrence;

pub(crate) use window::place_window;

/// Default half-width of the band around a daily fire time.
pub const SINGLE_FIRE_TOLERANCE_MS: i64 = 30_000;

/// Default half-width of the band around each burst step.
pub const BURST_TOLERANCE_MS: i64 = 2_000;

// ── Tolerances ──────────────────────────────────────────────────────

/// How far from the exact target instant a poll may land and still count.
///
/// The poll loop never lands exactly on a target; these bands absorb the
/// drift while the occurrence cache stops repeat fires inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerances {
    pub single_fire: TimeDelta,
    pub burst: TimeDelta,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            single_fire: TimeDelta::milliseconds(SINGLE_FIRE_TOLERANCE_MS),
            burst: TimeDelta::milliseconds(BURST_TOLERANCE_MS),
        }
    }
}

impl From<&SchedulerSettings> for Tolerances {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            single_fire: millis(settings.single_fire_tolerance_ms),
            burst: millis(settings.burst_tolerance_ms),
        }
    }
}

fn millis(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

// ── Decision ────────────────────────────────────────────────────────

/// Outcome of evaluating one alarm at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The alarm qualifies; `Occurrence` identifies which qualifying instant.
    Fire(Occurrence),
    Skip(SkipReason),
}

impl Decision {
    pub fn is_fire(&self) -> bool {
        matches!(self, Decision::Fire(_))
    }

    pub fn occurrence(&self) -> Option<Occurrence> {
        match self {
            Decision::Fire(occurrence) => Some(*occurrence),
            Decision::Skip(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Inactive,
    WeekdayNotSelected,
    /// The alarm can never ring as configured.
    InvalidSchedule(ScheduleError),
    /// Burst mode only: the instant lies outside the day's window.
    OutsideWindow,
    /// Not close enough to a target instant.
    OutsideTolerance,
    /// Qualifies, but this occurrence already rang.
    AlreadyFired(Occurrence),
}

// ── Evaluation ──────────────────────────────────────────────────────

/// Decide whether `alarm` rings at `now`.
pub fn evaluate(alarm: &Alarm, now: NaiveDateTime, tolerances: &Tolerances) -> Decision {
    if !alarm.active {
        return Decision::Skip(SkipReason::Inactive);
    }

    if !alarm.rings_on(now.weekday().into()) {
        return Decision::Skip(SkipReason::WeekdayNotSelected);
    }

    match alarm.trigger_mode() {
        Ok(TriggerMode::Daily(at)) => evaluate_daily(at, now, tolerances.single_fire),
        Ok(TriggerMode::Burst(window)) => evaluate_burst(&window, now, tolerances.burst),
        Err(e) => Decision::Skip(SkipReason::InvalidSchedule(e)),
    }
}

fn evaluate_daily(at: NaiveTime, now: NaiveDateTime, tolerance: TimeDelta) -> Decision {
    let target = now.date().and_time(at);
    let diff_ms = (now - target).num_milliseconds().abs();

    if diff_ms > tolerance.num_milliseconds() {
        return Decision::Skip(SkipReason::OutsideTolerance);
    }

    Decision::Fire(Occurrence::Minute {
        day: target.date(),
        hour: at.hour() as u8,
        minute: at.minute() as u8,
    })
}

fn evaluate_burst(window: &BurstWindow, now: NaiveDateTime, tolerance: TimeDelta) -> Decision {
    let (start, end) = place_window(window, now);
    if now < start || now > end {
        return Decision::Skip(SkipReason::OutsideWindow);
    }

    let elapsed = (now - start).num_milliseconds();
    let interval = window.interval_ms();
    let rem = elapsed % interval;
    let distance = rem.min(interval - rem);

    if distance > tolerance.num_milliseconds() {
        return Decision::Skip(SkipReason::OutsideTolerance);
    }

    // Nearest multiple, halves rounding up.
    let step = elapsed / interval + i64::from(rem * 2 >= interval);

    // Keyed by the window's start date so a step straddling midnight keeps one key.
    Decision::Fire(Occurrence::Step {
        day: start.date(),
        step,
    })
}
