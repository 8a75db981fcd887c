//! The persisted blob: settings plus the alarm list.
//!
//! Loaded once at startup and written back whenever the host changes
//! something. Any other sections a host keeps in the same file (timers,
//! stopwatch, world clocks) are ignored on load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alarm::Alarm;
use crate::error::ChimeError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourFormat {
    #[serde(rename = "12h")]
    H12,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme_id: String,
    pub hour_format: HourFormat,
    /// Ring volume, 0.0 to 1.0.
    pub sound_volume: f32,
    pub notifications_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_id: "light".to_string(),
            hour_format: HourFormat::H24,
            sound_volume: 0.7,
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub settings: AppSettings,
    pub alarms: Vec<Alarm>,
}

impl PersistedState {
    /// Read the blob at `path`. A missing file is an empty state, not an error.
    pub fn load(path: &Path) -> Result<Self, ChimeError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ChimeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write the blob, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), ChimeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        info!(path = %path.display(), alarms = self.alarms.len(), "state saved");
        Ok(())
    }

    pub fn alarm(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// Insert or replace an alarm by id.
    pub fn upsert_alarm(&mut self, alarm: Alarm) {
        match self.alarms.iter_mut().find(|a| a.id == alarm.id) {
            Some(existing) => *existing = alarm,
            None => self.alarms.push(alarm),
        }
    }

    pub fn remove_alarm(&mut self, id: &str) -> Option<Alarm> {
        let idx = self.alarms.iter().position(|a| a.id == id)?;
        Some(self.alarms.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Weekday;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = PersistedState::load(&dir.path().join("nope.json")).unwrap();
        assert!(state.alarms.is_empty());
        assert_eq!(state.settings, AppSettings::default());
    }

    #[test]
    fn save_then_load_preserves_alarms_and_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = PersistedState::default();
        state.settings.hour_format = HourFormat::H12;
        state.upsert_alarm(Alarm::new("a", 6, 45).with_weekdays([Weekday::Sat]));
        state.save(&path).unwrap();

        let loaded = PersistedState::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn ignores_unrelated_host_sections() {
        let raw = r#"{
            "settings": {"hourFormat": "12h", "notificationsEnabled": false},
            "timers": [{"id": "t1", "durationMs": 1000}],
            "stopwatch": {"isRunning": false, "elapsedMs": 0, "laps": []},
            "alarms": [{"id": "a", "hour": 7, "minute": 0, "active": true, "weekdays": ["mon"]}]
        }"#;
        let state = PersistedState::from_json(raw).unwrap();
        assert_eq!(state.settings.hour_format, HourFormat::H12);
        assert!(!state.settings.notifications_enabled);
        assert_eq!(state.settings.theme_id, "light");
        assert_eq!(state.alarms.len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PersistedState::load(&path),
            Err(ChimeError::Serialize(_))
        ));
    }

    #[test]
    fn upsert_replaces_and_remove_returns() {
        let mut state = PersistedState::default();
        state.upsert_alarm(Alarm::new("a", 1, 0));
        state.upsert_alarm(Alarm::new("a", 2, 0));
        assert_eq!(state.alarms.len(), 1);
        assert_eq!(state.alarm("a").unwrap().hour, 2);

        assert!(state.remove_alarm("a").is_some());
        assert!(state.remove_alarm("a").is_none());
    }
}
