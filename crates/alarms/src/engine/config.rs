use std::time::Duration;

use chime_core::config::SchedulerSettings;

use crate::evaluator::Tolerances;

/// Default delay between passes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay between passes. Must stay well under the burst tolerance band
    /// (4 s wide by default) or steps will be missed.
    pub poll_interval: Duration,
    pub tolerances: Tolerances,
}

impl EngineConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            tolerances: Tolerances::default(),
        }
    }
}

impl From<&SchedulerSettings> for EngineConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            // tokio panics on a zero period.
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            tolerances: Tolerances::from(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn default_polls_four_times_a_second() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.tolerances, Tolerances::default());
    }

    #[test]
    fn from_settings() {
        let settings = SchedulerSettings {
            poll_interval_ms: 0,
            single_fire_tolerance_ms: 10_000,
            burst_tolerance_ms: 500,
        };
        let config = EngineConfig::from(&settings);
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.tolerances.single_fire, TimeDelta::seconds(10));
        assert_eq!(config.tolerances.burst, TimeDelta::milliseconds(500));
    }
}
