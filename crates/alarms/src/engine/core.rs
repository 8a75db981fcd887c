use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::notifier::AlarmNotifier;
use crate::occurrence::{Occurrence, OccurrenceCache};
use crate::source::AlarmSource;

use super::config::EngineConfig;
use super::stats::EngineStats;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("alarm engine must be started from within a tokio runtime")]
    NoRuntime,
}

/// Mutable engine state, guarded by one lock.
///
/// `generation` changes on every start and stop; a poll loop only keeps
/// running while the generation it was spawned with is current.
#[derive(Debug, Default)]
pub(super) struct EngineState {
    pub(super) running: bool,
    pub(super) generation: u64,
    pub(super) cache: OccurrenceCache,
    pub(super) stats: EngineStats,
}

impl EngineState {
    /// Whether a pass for `generation` may run. Manual passes pass `None`.
    pub(super) fn is_live(&self, generation: Option<u64>) -> bool {
        self.running && generation.map_or(true, |g| g == self.generation)
    }
}

pub(super) struct Shared {
    pub(super) config: EngineConfig,
    pub(super) source: Arc<dyn AlarmSource>,
    pub(super) notifier: Arc<dyn AlarmNotifier>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) state: Mutex<EngineState>,
}

impl Shared {
    pub(super) fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("engine state lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    async fn poll_loop(self: Arc<Self>, generation: u64) {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if self.pass(Some(generation), self.clock.now()).is_none() {
                break;
            }
        }

        debug!(generation, "poll loop exited");
    }
}

/// Polls the alarm source on a fixed cadence and rings each qualifying
/// occurrence exactly once.
///
/// Construct one per process at the composition root and share it by
/// reference. Dropping the engine aborts its poll task.
pub struct AlarmEngine {
    pub(super) shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AlarmEngine {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn AlarmSource>,
        notifier: Arc<dyn AlarmNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                source,
                notifier,
                clock,
                state: Mutex::new(EngineState::default()),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start polling. Runs one pass immediately, then one per poll interval.
    ///
    /// Calling `start` on a running engine does nothing.
    pub fn start(&self) -> Result<(), EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let generation = {
            let mut state = self.shared.lock_state();
            if state.running {
                debug!("alarm engine already running");
                return Ok(());
            }
            state.running = true;
            state.generation += 1;
            state.generation
        };

        info!(
            generation,
            poll_ms = self.shared.config.poll_interval.as_millis() as u64,
            "alarm engine started"
        );

        self.shared.pass(Some(generation), self.shared.clock.now());

        let task = runtime.spawn(Arc::clone(&self.shared).poll_loop(generation));
        if let Some(previous) = self.lock_task().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Stop polling and forget every fired occurrence.
    ///
    /// Takes effect immediately: a pass that has not yet taken the state
    /// lock becomes a no-op, and a pass already notifying skips the alarms it
    /// has not reached. A notifier call already in progress is not interrupted.
    /// Calling `stop` on a stopped engine does nothing.
    pub fn stop(&self) {
        let was_running = {
            let mut state = self.shared.lock_state();
            let was_running = state.running;
            state.running = false;
            state.generation += 1;
            state.cache.clear();
            was_running
        };

        if let Some(task) = self.lock_task().take() {
            task.abort();
        }

        if was_running {
            info!("alarm engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock_state().running
    }

    pub fn stats(&self) -> EngineStats {
        self.shared.lock_state().stats.clone()
    }

    /// Number of alarms with a recorded occurrence.
    pub fn cache_len(&self) -> usize {
        self.shared.lock_state().cache.len()
    }

    /// The occurrence most recently rung for `alarm_id` since the last start.
    pub fn last_fired(&self, alarm_id: &str) -> Option<Occurrence> {
        self.shared.lock_state().cache.last(alarm_id).copied()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AlarmEngine {
    fn drop(&mut self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }
}
