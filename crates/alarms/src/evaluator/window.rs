//! Placing a daily repetition window on the calendar.

use chrono::{NaiveDateTime, TimeDelta};

use chime_core::BurstWindow;

/// Concrete `[start, end]` of the window occurrence relevant to `reference`.
///
/// Both ends are first put on `reference`'s date. A window that wraps past
/// midnight (end before start) is then stretched: if `reference` is still
/// before the end it belongs to the window that began yesterday, otherwise to
/// the one that ends tomorrow. `start <= end` always holds on return.
pub(crate) fn place_window(
    window: &BurstWindow,
    reference: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let day = reference.date();
    let mut start = day.and_time(window.start);
    let mut end = day.and_time(window.end);

    if end < start {
        if reference < end {
            start -= TimeDelta::days(1);
        } else {
            end += TimeDelta::days(1);
        }
    }

    (start, end)
}
