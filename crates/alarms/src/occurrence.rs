//! Occurrence keys and the per-alarm de-duplication cache.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use chime_core::Alarm;

use crate::evaluator::{evaluate, Decision, SkipReason, Tolerances};

/// Identifies one qualifying instant of one alarm.
///
/// Two evaluations that land in the same tolerance band produce equal
/// occurrences; that equality is what blocks a second ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occurrence {
    /// Daily mode: the target minute.
    Minute { day: NaiveDate, hour: u8, minute: u8 },
    /// Burst mode: the interval step since the window start, keyed by the
    /// date the window opened.
    Step { day: NaiveDate, step: i64 },
}

impl Occurrence {
    pub fn day(&self) -> NaiveDate {
        match self {
            Occurrence::Minute { day, .. } | Occurrence::Step { day, .. } => *day,
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occurrence::Minute { day, hour, minute } => write!(f, "{day} {hour:02}:{minute:02}"),
            Occurrence::Step { day, step } => write!(f, "{day} step {step}"),
        }
    }
}

// ── Cache ───────────────────────────────────────────────────────────

/// Most recent occurrence fired per alarm id.
///
/// Holds one entry per alarm: admitting a new occurrence overwrites the
/// previous one. Lives only as long as the running engine.
#[derive(Debug, Default)]
pub struct OccurrenceCache {
    last: HashMap<String, Occurrence>,
}

impl OccurrenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `occurrence` for `alarm_id` unless it is the one already stored.
    ///
    /// Returns `true` when the occurrence is new and should ring.
    pub fn admit(&mut self, alarm_id: &str, occurrence: Occurrence) -> bool {
        match self.last.get_mut(alarm_id) {
            Some(previous) if *previous == occurrence => false,
            Some(previous) => {
                *previous = occurrence;
                true
            }
            None => {
                self.last.insert(alarm_id.to_string(), occurrence);
                true
            }
        }
    }

    /// Evaluate `alarm` at `now` and admit the result.
    ///
    /// A qualifying occurrence that already rang comes back as
    /// [`SkipReason::AlreadyFired`]. A returned [`Decision::Fire`] has already
    /// been recorded.
    pub fn check(&mut self, alarm: &Alarm, now: NaiveDateTime, tolerances: &Tolerances) -> Decision {
        match evaluate(alarm, now, tolerances) {
            Decision::Fire(occurrence) if !self.admit(&alarm.id, occurrence) => {
                Decision::Skip(SkipReason::AlreadyFired(occurrence))
            }
            decision => decision,
        }
    }

    pub fn last(&self, alarm_id: &str) -> Option<&Occurrence> {
        self.last.get(alarm_id)
    }

    /// Forget everything; every alarm is re-armed.
    pub fn clear(&mut self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn admit_blocks_only_the_stored_occurrence() {
        let mut cache = OccurrenceCache::new();
        let first = Occurrence::Step { day: day(19), step: 1 };
        let second = Occurrence::Step { day: day(19), step: 2 };

        assert!(cache.admit("a", first));
        assert!(!cache.admit("a", first));
        assert!(cache.admit("a", second));
        assert_eq!(cache.last("a"), Some(&second));

        // Only the latest key is kept, so the old one is admissible again.
        assert!(cache.admit("a", first));
    }

    #[test]
    fn alarms_are_tracked_independently() {
        let mut cache = OccurrenceCache::new();
        let occ = Occurrence::Minute { day: day(19), hour: 7, minute: 30 };

        assert!(cache.admit("a", occ));
        assert!(cache.admit("b", occ));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.admit("a", occ));
    }

    #[test]
    fn display_is_readable() {
        let minute = Occurrence::Minute { day: day(19), hour: 7, minute: 5 };
        let step = Occurrence::Step { day: day(19), step: 3 };
        assert_eq!(minute.to_string(), "2026-10-19 07:05");
        assert_eq!(step.to_string(), "2026-10-19 step 3");
        assert_eq!(step.day(), day(19));
    }
}
