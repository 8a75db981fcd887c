use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use chime_core::Alarm;

use crate::evaluator::{Decision, SkipReason};
use crate::source::SourceError;

use super::core::{AlarmEngine, Shared};

/// What one pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// The instant alarms were evaluated against.
    pub at: NaiveDateTime,
    /// Alarms read from the source.
    pub evaluated: usize,
    /// Ids handed to the notifier, in list order. Alarms whose notification
    /// was cut short by `stop` are left out.
    pub fired: Vec<String>,
    /// Notifier calls that failed or panicked.
    pub notify_failures: usize,
    /// The alarm list could not be read; nothing was evaluated.
    pub source_failed: bool,
}

impl PassReport {
    fn new(at: NaiveDateTime) -> Self {
        Self {
            at,
            evaluated: 0,
            fired: Vec::new(),
            notify_failures: 0,
            source_failed: false,
        }
    }
}

impl AlarmEngine {
    /// Run one pass against the engine clock.
    ///
    /// Returns `None` when the engine is stopped.
    pub fn run_pass(&self) -> Option<PassReport> {
        self.shared.pass(None, self.shared.clock.now())
    }

    /// Run one pass as if the wall clock read `now`.
    ///
    /// Returns `None` when the engine is stopped.
    pub fn run_pass_at(&self, now: NaiveDateTime) -> Option<PassReport> {
        self.shared.pass(None, now)
    }
}

impl Shared {
    /// Evaluate every alarm at `now` and notify the ones that fire.
    ///
    /// The cache is consulted and updated under the state lock; notifiers run
    /// after it is released so a slow notifier never blocks `stop`. Liveness is
    /// re-checked before each notification, so nothing rings once `stop` returns.
    pub(super) fn pass(&self, generation: Option<u64>, now: NaiveDateTime) -> Option<PassReport> {
        if !self.lock_state().is_live(generation) {
            return None;
        }
        let fetched = self.fetch_alarms();
        let mut report = PassReport::new(now);

        let fired = {
            let mut state = self.lock_state();
            if !state.is_live(generation) {
                return None;
            }

            let alarms = match fetched {
                Ok(alarms) => alarms,
                Err(e) => {
                    warn!(error = %e, "could not read alarms, skipping pass");
                    state.stats.source_failures += 1;
                    report.source_failed = true;
                    return Some(report);
                }
            };
            report.evaluated = alarms.len();

            let mut fired = Vec::new();
            for alarm in alarms {
                match state.cache.check(&alarm, now, &self.config.tolerances) {
                    Decision::Fire(occurrence) => {
                        info!(alarm_id = %alarm.id, %occurrence, "alarm fired");
                        fired.push(alarm);
                    }
                    Decision::Skip(SkipReason::InvalidSchedule(e)) => {
                        debug!(alarm_id = %alarm.id, error = %e, "alarm can never fire");
                    }
                    Decision::Skip(_) => {}
                }
            }

            state.stats.passes += 1;
            state.stats.fires += fired.len() as u64;
            state.stats.last_pass_at = Some(now);
            fired
        };

        for alarm in &fired {
            if !self.lock_state().is_live(generation) {
                debug!(alarm_id = %alarm.id, "engine stopped mid-pass, not notifying");
                break;
            }
            if let Err(reason) = self.notify(alarm) {
                warn!(
                    alarm_id = %alarm.id,
                    notifier = self.notifier.name(),
                    error = %reason,
                    "notifier failed"
                );
                report.notify_failures += 1;
            }
            report.fired.push(alarm.id.clone());
        }

        if report.notify_failures > 0 {
            self.lock_state().stats.notify_failures += report.notify_failures as u64;
        }

        Some(report)
    }

    fn fetch_alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        catch_unwind(AssertUnwindSafe(|| self.source.alarms())).unwrap_or_else(|payload| {
            Err(SourceError::Other(format!(
                "alarm source panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }

    fn notify(&self, alarm: &Alarm) -> Result<(), String> {
        match catch_unwind(AssertUnwindSafe(|| self.notifier.notify(alarm))) {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
