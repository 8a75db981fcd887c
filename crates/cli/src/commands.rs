use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::info;

use chime_alarms::display::{format_duration, format_time_short, weekday_initials, window_label};
use chime_alarms::{
    predict_all, soonest, AlarmEngine, Clock, EngineConfig, FileAlarmSource, LocalClock,
};
use chime_core::{Alarm, HourFormat, PersistedState};

use crate::console::ConsoleNotifier;
use crate::terminal::Terminal;

const AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `chime run`: ring alarms from `state_file` until Ctrl-C.
pub async fn run(state_file: &Path, engine_config: EngineConfig, terminal: Terminal) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(LocalClock);
    let source = Arc::new(FileAlarmSource::new(state_file));
    let alarms = source
        .state()
        .with_context(|| format!("failed to read {}", state_file.display()))?
        .alarms
        .len();

    let notifier = Arc::new(ConsoleNotifier::new(terminal, source.clone(), clock.clone()));
    let engine = AlarmEngine::new(engine_config, source, notifier, clock);

    terminal.print_banner(&state_file.display().to_string(), alarms)?;
    engine.start().context("failed to start alarm engine")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    engine.stop();
    let stats = engine.stats();
    info!(
        passes = stats.passes,
        fires = stats.fires,
        notify_failures = stats.notify_failures,
        source_failures = stats.source_failures,
        "shutting down"
    );
    Ok(())
}

/// `chime next`: each alarm's next ring from `at` (default: now).
pub fn next(state_file: &Path, at: Option<&str>, terminal: Terminal) -> Result<()> {
    let state = load(state_file)?;
    let from = match at {
        Some(at) => parse_at(at)?,
        None => LocalClock.now(),
    };
    let format = state.settings.hour_format;

    if state.alarms.is_empty() {
        terminal.print_info("No alarms.")?;
        return Ok(());
    }

    for (alarm, next) in predict_all(&state.alarms, from) {
        let next = next.map(|n| format!("{} {}", n.format("%a %Y-%m-%d"), format_time_short(n.time(), format)));
        terminal.print_next(
            alarm.display_name(),
            &weekday_initials(alarm),
            &schedule_label(alarm, format),
            next.as_deref(),
        )?;
    }

    if let Some((alarm, at)) = soonest(&state.alarms, from) {
        terminal.print_info(&format!(
            "Next: {} in {}",
            alarm.display_name(),
            format_duration(at - from)
        ))?;
    }
    Ok(())
}

/// `chime check`: alarms whose configuration can never ring.
pub fn check(state_file: &Path, terminal: Terminal) -> Result<()> {
    let state = load(state_file)?;
    let mut problems = 0;

    for alarm in &state.alarms {
        if let Some(reason) = never_rings(alarm) {
            terminal.print_problem(alarm.display_name(), &reason)?;
            problems += 1;
        }
    }

    if problems == 0 {
        terminal.print_info(&format!("All {} alarms can ring.", state.alarms.len()))?;
    }
    Ok(())
}

fn load(state_file: &Path) -> Result<PersistedState> {
    PersistedState::load(state_file).with_context(|| format!("failed to read {}", state_file.display()))
}

fn parse_at(at: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(at, AT_FORMAT)
        .with_context(|| format!("invalid --at '{at}', expected YYYY-MM-DD HH:MM"))
}

fn schedule_label(alarm: &Alarm, format: HourFormat) -> String {
    match alarm.burst_window() {
        Some(window) => window_label(window, format),
        None => match alarm.daily_time() {
            Ok(time) => format!("daily at {}", format_time_short(time, format)),
            Err(e) => e.to_string(),
        },
    }
}

/// Why `alarm` can never ring, if it can't. Inactive alarms are not reported.
fn never_rings(alarm: &Alarm) -> Option<String> {
    if !alarm.active {
        return None;
    }
    if alarm.weekdays.is_empty() {
        return Some("no weekdays selected".to_string());
    }
    alarm.trigger_mode().err().map(|e| e.to_string())
}
