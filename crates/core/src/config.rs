use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env_opt(key) {
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, default, "ignoring unparseable env value");
            default
        }),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub scheduler: SchedulerSettings,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig::from_env(),
            scheduler: SchedulerSettings::from_env(),
            log_filter: env_or("CHIME_LOG", "info"),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  storage:    state_file={}", self.storage.state_file.display());
        tracing::info!(
            "  scheduler:  poll={}ms, single_fire_tolerance={}ms, burst_tolerance={}ms",
            self.scheduler.poll_interval_ms,
            self.scheduler.single_fire_tolerance_ms,
            self.scheduler.burst_tolerance_ms,
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            scheduler: SchedulerSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON blob holding settings and alarms.
    pub state_file: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            state_file: PathBuf::from(env_or("CHIME_STATE_FILE", DEFAULT_STATE_FILE)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

const DEFAULT_STATE_FILE: &str = "data/chime-state.json";

// ── Scheduler ─────────────────────────────────────────────────

/// Poll cadence and trigger tolerances, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Half-width of the band around a single daily fire time.
    #[serde(default = "default_single_fire_tolerance_ms")]
    pub single_fire_tolerance_ms: u64,
    /// Half-width of the band around each burst step.
    #[serde(default = "default_burst_tolerance_ms")]
    pub burst_tolerance_ms: u64,
}

fn default_poll_interval_ms() -> u64 { 250 }
fn default_single_fire_tolerance_ms() -> u64 { 30_000 }
fn default_burst_tolerance_ms() -> u64 { 2_000 }

impl SchedulerSettings {
    fn from_env() -> Self {
        Self {
            poll_interval_ms: env_u64("CHIME_POLL_INTERVAL_MS", default_poll_interval_ms()),
            single_fire_tolerance_ms: env_u64(
                "CHIME_SINGLE_FIRE_TOLERANCE_MS",
                default_single_fire_tolerance_ms(),
            ),
            burst_tolerance_ms: env_u64("CHIME_BURST_TOLERANCE_MS", default_burst_tolerance_ms()),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            single_fire_tolerance_ms: default_single_fire_tolerance_ms(),
            burst_tolerance_ms: default_burst_tolerance_ms(),
        }
    }
}
