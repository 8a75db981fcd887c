//! Next-occurrence prediction for display ("next alarm at 07:30").
//!
//! Independent of the live occurrence cache: predicting never consumes or
//! records anything.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta};

use chime_core::{Alarm, BurstWindow, TriggerMode};

use crate::evaluator::place_window;

/// Days scanned ahead, counting the starting day.
///
/// An alarm whose only selected weekday is today, with today's instant
/// already past, predicts nothing (next week is outside the horizon).
pub const PREDICTION_HORIZON_DAYS: u64 = 7;

/// The next instant strictly after `from` at which `alarm` is scheduled.
///
/// Returns `None` for inactive alarms, invalid schedules, and when nothing
/// falls inside the horizon. A burst step landing exactly on `from` is
/// skipped in favor of the following step the same day, not the next day.
pub fn predict_next(alarm: &Alarm, from: NaiveDateTime) -> Option<NaiveDateTime> {
    if !alarm.active {
        return None;
    }
    let mode = alarm.trigger_mode().ok()?;

    (0..PREDICTION_HORIZON_DAYS).find_map(|offset| {
        let day = from.date().checked_add_days(Days::new(offset))?;
        if !alarm.rings_on(day.weekday().into()) {
            return None;
        }

        match mode {
            TriggerMode::Daily(at) => Some(day.and_time(at)).filter(|candidate| *candidate > from),
            TriggerMode::Burst(window) => next_step_on(&window, day, offset == 0, from),
        }
    })
}

/// First burst step on `day` strictly after `from`.
///
/// On the first scanned day the search starts at `from` itself, which may
/// sit inside a window that began the previous evening. Later days start at
/// their own window start.
fn next_step_on(
    window: &BurstWindow,
    day: NaiveDate,
    first_day: bool,
    from: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let reference = if first_day { from } else { day.and_time(window.start) };
    let (start, end) = place_window(window, reference);

    if reference > end {
        return None;
    }

    let interval = window.interval_ms();
    let mut candidate = if reference > start {
        let elapsed = (reference - start).num_milliseconds();
        let steps = elapsed / interval + i64::from(elapsed % interval != 0);
        start.checked_add_signed(TimeDelta::milliseconds(steps.checked_mul(interval)?))?
    } else {
        start
    };

    if candidate <= from {
        candidate = candidate.checked_add_signed(window.interval)?;
    }

    (candidate <= end && candidate > from).then_some(candidate)
}

/// Predictions for every alarm, in input order.
pub fn predict_all(alarms: &[Alarm], from: NaiveDateTime) -> Vec<(&Alarm, Option<NaiveDateTime>)> {
    alarms
        .iter()
        .map(|alarm| (alarm, predict_next(alarm, from)))
        .collect()
}

/// The alarm that rings soonest after `from`. Ties go to the earlier alarm in the list.
pub fn soonest(alarms: &[Alarm], from: NaiveDateTime) -> Option<(&Alarm, NaiveDateTime)> {
    alarms
        .iter()
        .filter_map(|alarm| predict_next(alarm, from).map(|next| (alarm, next)))
        .min_by_key(|(_, next)| *next)
}
