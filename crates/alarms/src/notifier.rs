//! Side effects run when an alarm fires.
//!
//! The engine knows nothing about sound, system notifications or UI state;
//! it hands each fired alarm to an [`AlarmNotifier`] supplied by the host.

use std::sync::Mutex;

use chime_core::Alarm;

/// Errors a notifier may report. The engine logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("notification failed: {0}")]
    Failed(String),
}

pub trait AlarmNotifier: Send + Sync {
    /// Called once per fired occurrence.
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        "notifier"
    }
}

/// Adapts a closure into a notifier.
pub struct FnNotifier<F> {
    name: String,
    f: F,
}

impl<F> FnNotifier<F>
where
    F: Fn(&Alarm) -> Result<(), NotifyError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> AlarmNotifier for FnNotifier<F>
where
    F: Fn(&Alarm) -> Result<(), NotifyError> + Send + Sync,
{
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        (self.f)(alarm)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Tracks which alarm is currently ringing.
///
/// The latest fire wins; the host clears it when the user dismisses.
#[derive(Debug, Default)]
pub struct RingingNotifier {
    ringing: Mutex<Option<String>>,
}

impl RingingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the ringing alarm, if any.
    pub fn ringing(&self) -> Option<String> {
        self.ringing.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Dismiss. Returns the id that was ringing.
    pub fn clear(&self) -> Option<String> {
        self.ringing.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl AlarmNotifier for RingingNotifier {
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        *self.ringing.lock().unwrap_or_else(|e| e.into_inner()) = Some(alarm.id.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "ringing"
    }
}
