//! Where the engine gets the alarm list on each pass.
//!
//! The engine never owns alarms. Every pass asks an [`AlarmSource`] for the
//! current list, so edits made by the host take effect on the next poll.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use tracing::{debug, info};

use chime_core::{Alarm, AppSettings, ChimeError, PersistedState};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to load alarms: {0}")]
    Load(#[from] ChimeError),

    #[error("alarm list lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Other(String),
}

pub trait AlarmSource: Send + Sync {
    fn alarms(&self) -> Result<Vec<Alarm>, SourceError>;
}

// ── In-memory list ──────────────────────────────────────────────────

/// An alarm list shared between the host and the engine.
///
/// Cloning shares the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct SharedAlarms {
    inner: Arc<RwLock<Vec<Alarm>>>,
}

impl SharedAlarms {
    pub fn new(alarms: Vec<Alarm>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(alarms)),
        }
    }

    pub fn replace(&self, alarms: Vec<Alarm>) -> Result<(), SourceError> {
        *self.inner.write().map_err(|_| SourceError::LockPoisoned)? = alarms;
        Ok(())
    }

    /// Insert or replace an alarm by id.
    pub fn upsert(&self, alarm: Alarm) -> Result<(), SourceError> {
        let mut alarms = self.inner.write().map_err(|_| SourceError::LockPoisoned)?;
        match alarms.iter_mut().find(|a| a.id == alarm.id) {
            Some(existing) => *existing = alarm,
            None => alarms.push(alarm),
        }
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<Option<Alarm>, SourceError> {
        let mut alarms = self.inner.write().map_err(|_| SourceError::LockPoisoned)?;
        Ok(alarms
            .iter()
            .position(|a| a.id == id)
            .map(|idx| alarms.remove(idx)))
    }
}

impl AlarmSource for SharedAlarms {
    fn alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        self.inner
            .read()
            .map(|alarms| alarms.clone())
            .map_err(|_| SourceError::LockPoisoned)
    }
}

// ── Persisted blob ──────────────────────────────────────────────────

/// Reads alarms from the persisted state file.
///
/// The file is re-parsed only when its modification time changes, so hosts
/// that save on every edit are picked up without polling the parser. A
/// missing file reads as an empty list.
#[derive(Debug)]
pub struct FileAlarmSource {
    path: PathBuf,
    cached: Mutex<Option<CachedState>>,
}

#[derive(Debug)]
struct CachedState {
    modified: SystemTime,
    state: PersistedState,
}

impl FileAlarmSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings from the most recent successful load.
    pub fn settings(&self) -> Option<AppSettings> {
        self.cached
            .lock()
            .ok()?
            .as_ref()
            .map(|c| c.state.settings.clone())
    }

    /// Current state, reloading from disk if the file changed.
    pub fn state(&self) -> Result<PersistedState, SourceError> {
        let modified = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "state file missing, no alarms");
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(SourceError::Load(e.into())),
        };

        let mut cached = self.cached.lock().map_err(|_| SourceError::LockPoisoned)?;
        if let Some(c) = cached.as_ref().filter(|c| c.modified == modified) {
            return Ok(c.state.clone());
        }

        let state = PersistedState::load(&self.path)?;
        info!(
            path = %self.path.display(),
            alarms = state.alarms.len(),
            "loaded alarm state"
        );
        *cached = Some(CachedState {
            modified,
            state: state.clone(),
        });
        Ok(state)
    }
}

impl AlarmSource for FileAlarmSource {
    fn alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        self.state().map(|s| s.alarms)
    }
}
