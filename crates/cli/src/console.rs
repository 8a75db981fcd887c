use std::sync::Arc;

use tracing::debug;

use chime_alarms::display::format_time;
use chime_alarms::{AlarmNotifier, Clock, FileAlarmSource, NotifyError};
use chime_core::Alarm;

use crate::terminal::Terminal;

/// Prints a ring line for each fired alarm.
///
/// Honors the `notificationsEnabled` and `hourFormat` settings from the most
/// recent load of the state file.
pub struct ConsoleNotifier {
    terminal: Terminal,
    source: Arc<FileAlarmSource>,
    clock: Arc<dyn Clock>,
}

impl ConsoleNotifier {
    pub fn new(terminal: Terminal, source: Arc<FileAlarmSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            terminal,
            source,
            clock,
        }
    }
}

impl AlarmNotifier for ConsoleNotifier {
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        let settings = self.source.settings().unwrap_or_default();
        if !settings.notifications_enabled {
            debug!(alarm_id = %alarm.id, "notifications disabled, not printing");
            return Ok(());
        }

        let time = format_time(self.clock.now().time(), settings.hour_format);
        self.terminal
            .print_ring(&time, alarm.display_name())
            .map_err(|e| NotifyError::Unavailable(e.to_string()))
    }

    fn name(&self) -> &str {
        "console"
    }
}
