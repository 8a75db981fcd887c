use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use chime_core::{Alarm, RepetitionWindow, Weekday};

use crate::clock::FixedClock;
use crate::notifier::{AlarmNotifier, NotifyError};
use crate::source::{AlarmSource, SharedAlarms, SourceError};

use super::*;

// 2026-10-19 is a Monday.
fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    rung: Mutex<Vec<String>>,
}

impl Recorder {
    fn rung(&self) -> Vec<String> {
        self.rung.lock().unwrap().clone()
    }
}

impl AlarmNotifier for Recorder {
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        match alarm.id.as_str() {
            "broken" => Err(NotifyError::Failed("speaker missing".into())),
            "panics" => panic!("notifier blew up"),
            id => {
                self.rung.lock().unwrap().push(id.to_string());
                Ok(())
            }
        }
    }
}

/// Fails the first `failures` reads, then serves `alarms`.
struct FlakySource {
    failures: AtomicUsize,
    alarms: Vec<Alarm>,
}

impl AlarmSource for FlakySource {
    fn alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(SourceError::Other("disk unplugged".into()));
        }
        Ok(self.alarms.clone())
    }
}

/// Counts reads.
struct CountingSource {
    reads: AtomicUsize,
    alarms: Vec<Alarm>,
}

impl AlarmSource for CountingSource {
    fn alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.alarms.clone())
    }
}

/// Records the ring, then stops the engine it is attached to.
#[derive(Default)]
struct StopOnRing {
    engine: OnceLock<Weak<AlarmEngine>>,
    rung: Mutex<Vec<String>>,
}

impl AlarmNotifier for StopOnRing {
    fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        self.rung.lock().unwrap().push(alarm.id.clone());
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            engine.stop();
        }
        Ok(())
    }
}

fn weekday_alarm(id: &str, hour: u8, minute: u8) -> Alarm {
    Alarm::new(id, hour, minute).with_weekdays([Weekday::Mon])
}

struct Harness {
    engine: AlarmEngine,
    clock: Arc<FixedClock>,
    alarms: SharedAlarms,
    recorder: Arc<Recorder>,
}

fn harness(now: NaiveDateTime, alarms: Vec<Alarm>) -> Harness {
    let clock = Arc::new(FixedClock::new(now));
    let shared = SharedAlarms::new(alarms);
    let recorder = Arc::new(Recorder::default());
    let engine = AlarmEngine::new(
        EngineConfig::default(),
        Arc::new(shared.clone()),
        recorder.clone(),
        clock.clone(),
    );
    Harness {
        engine,
        clock,
        alarms: shared,
        recorder,
    }
}

// -- lifecycle -----------------------------------------------------

#[test]
fn start_outside_runtime_fails() {
    let h = harness(at(7, 0, 0), vec![]);
    assert!(matches!(h.engine.start(), Err(EngineError::NoRuntime)));
    assert!(!h.engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn start_runs_an_immediate_pass() {
    let h = harness(at(7, 0, 10), vec![weekday_alarm("wake", 7, 0)]);
    h.engine.start().unwrap();

    assert!(h.engine.is_running());
    assert_eq!(h.recorder.rung(), vec!["wake"]);
    assert_eq!(h.engine.stats().passes, 1);
    assert_eq!(h.engine.stats().last_pass_at, Some(at(7, 0, 10)));
}

#[tokio::test(start_paused = true)]
async fn start_twice_is_a_no_op() {
    let h = harness(at(7, 0, 0), vec![]);
    h.engine.start().unwrap();
    h.engine.start().unwrap();
    assert_eq!(h.engine.stats().passes, 1);
}

#[tokio::test(start_paused = true)]
async fn loop_polls_on_the_configured_interval() {
    let h = harness(at(6, 0, 0), vec![]);
    h.engine.start().unwrap();

    tokio::time::sleep(Duration::from_millis(1_010)).await;
    // One immediate pass plus four 250 ms ticks.
    assert_eq!(h.engine.stats().passes, 5);
}

#[tokio::test(start_paused = true)]
async fn repeated_ticks_ring_an_occurrence_once() {
    let h = harness(at(7, 0, 0), vec![weekday_alarm("wake", 7, 0)]);
    h.engine.start().unwrap();

    for _ in 0..40 {
        h.clock.advance(TimeDelta::milliseconds(250));
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    assert_eq!(h.recorder.rung(), vec!["wake"]);
    assert_eq!(h.engine.stats().fires, 1);
    assert!(h.engine.stats().passes > 30);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_polling_and_restart_rearms() {
    let h = harness(at(7, 0, 0), vec![weekday_alarm("wake", 7, 0)]);
    h.engine.start().unwrap();
    assert_eq!(h.engine.cache_len(), 1);

    h.engine.stop();
    assert!(!h.engine.is_running());
    assert_eq!(h.engine.cache_len(), 0);
    assert!(h.engine.last_fired("wake").is_none());

    let passes = h.engine.stats().passes;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.engine.stats().passes, passes);
    assert!(h.engine.run_pass().is_none());

    // Same occurrence, fresh cache: it rings again.
    h.engine.start().unwrap();
    assert_eq!(h.recorder.rung(), vec!["wake", "wake"]);
}

#[tokio::test(start_paused = true)]
async fn stop_twice_is_harmless() {
    let h = harness(at(7, 0, 0), vec![]);
    h.engine.stop();
    h.engine.start().unwrap();
    h.engine.stop();
    h.engine.stop();
    assert!(!h.engine.is_running());
}

// -- passes --------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn edits_are_seen_on_the_next_pass() {
    let h = harness(at(7, 0, 0), vec![]);
    h.engine.start().unwrap();
    assert!(h.recorder.rung().is_empty());

    h.alarms.upsert(weekday_alarm("late-add", 7, 0)).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.recorder.rung(), vec!["late-add"]);
}

#[tokio::test(start_paused = true)]
async fn burst_rings_each_step_once() {
    let window = RepetitionWindow {
        enabled: true,
        interval_ms: 60_000,
        start_time: "08:00".into(),
        end_time: "09:00".into(),
    };
    let alarm = weekday_alarm("burst", 0, 0).with_repetition(window);
    let h = harness(at(7, 59, 0), vec![alarm]);
    h.engine.start().unwrap();

    let mut now = at(7, 59, 58);
    let end = at(8, 3, 30);
    let mut rings = 0;
    while now <= end {
        rings += h.engine.run_pass_at(now).unwrap().fired.len();
        now += TimeDelta::milliseconds(250);
    }

    // Steps at 08:00, 08:01, 08:02 and 08:03.
    assert_eq!(rings, 4);
}

#[tokio::test(start_paused = true)]
async fn failing_notifiers_do_not_block_other_alarms() {
    let h = harness(
        at(7, 0, 0),
        vec![
            weekday_alarm("broken", 7, 0),
            weekday_alarm("panics", 7, 0),
            weekday_alarm("fine", 7, 0),
        ],
    );
    h.engine.start().unwrap();

    assert_eq!(h.recorder.rung(), vec!["fine"]);
    let stats = h.engine.stats();
    assert_eq!(stats.fires, 3);
    assert_eq!(stats.notify_failures, 2);

    // A failed notification still counts as rung for that occurrence.
    let report = h.engine.run_pass_at(at(7, 0, 5)).unwrap();
    assert!(report.fired.is_empty());
    assert!(h.engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn pass_report_lists_fired_ids_in_order() {
    let h = harness(
        at(6, 0, 0),
        vec![
            weekday_alarm("b", 7, 0),
            weekday_alarm("skip", 9, 0),
            weekday_alarm("a", 7, 0),
        ],
    );
    h.engine.start().unwrap();

    let report = h.engine.run_pass_at(at(7, 0, 1)).unwrap();
    assert_eq!(report.at, at(7, 0, 1));
    assert_eq!(report.evaluated, 3);
    assert_eq!(report.fired, vec!["b", "a"]);
    assert_eq!(report.notify_failures, 0);
    assert!(!report.source_failed);
}

#[tokio::test(start_paused = true)]
async fn source_errors_skip_the_pass_but_keep_polling() {
    let clock = Arc::new(FixedClock::new(at(7, 0, 0)));
    let recorder = Arc::new(Recorder::default());
    let source = Arc::new(FlakySource {
        failures: AtomicUsize::new(2),
        alarms: vec![weekday_alarm("wake", 7, 0)],
    });
    let engine = AlarmEngine::new(EngineConfig::default(), source, recorder.clone(), clock);

    engine.start().unwrap();
    assert!(recorder.rung().is_empty());

    tokio::time::sleep(Duration::from_millis(800)).await;
    let stats = engine.stats();
    assert_eq!(stats.source_failures, 2);
    assert_eq!(stats.fires, 1);
    assert_eq!(recorder.rung(), vec!["wake"]);
    assert!(engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn invalid_alarms_are_skipped_silently() {
    let bad_window = RepetitionWindow {
        enabled: true,
        interval_ms: 0,
        start_time: "07:00".into(),
        end_time: "08:00".into(),
    };
    let h = harness(
        at(7, 0, 0),
        vec![
            weekday_alarm("bad", 7, 0).with_repetition(bad_window),
            weekday_alarm("good", 7, 0),
        ],
    );
    h.engine.start().unwrap();
    assert_eq!(h.recorder.rung(), vec!["good"]);
}

#[tokio::test(start_paused = true)]
async fn stopped_engine_does_not_read_the_source() {
    let source = Arc::new(CountingSource {
        reads: AtomicUsize::new(0),
        alarms: vec![weekday_alarm("wake", 7, 0)],
    });
    let engine = AlarmEngine::new(
        EngineConfig::default(),
        source.clone(),
        Arc::new(Recorder::default()),
        Arc::new(FixedClock::new(at(6, 0, 0))),
    );

    assert!(engine.run_pass().is_none());
    assert_eq!(source.reads.load(Ordering::SeqCst), 0);

    engine.start().unwrap();
    engine.stop();
    let reads = source.reads.load(Ordering::SeqCst);
    assert!(engine.run_pass_at(at(7, 0, 0)).is_none());
    assert_eq!(source.reads.load(Ordering::SeqCst), reads);
}

#[tokio::test(start_paused = true)]
async fn stop_during_notification_skips_remaining_alarms() {
    let notifier = Arc::new(StopOnRing::default());
    let engine = Arc::new(AlarmEngine::new(
        EngineConfig::default(),
        Arc::new(SharedAlarms::new(vec![
            weekday_alarm("first", 7, 0),
            weekday_alarm("second", 7, 0),
        ])),
        notifier.clone(),
        Arc::new(FixedClock::new(at(6, 0, 0))),
    ));
    let _ = notifier.engine.set(Arc::downgrade(&engine));

    engine.start().unwrap();
    let report = engine.run_pass_at(at(7, 0, 0)).unwrap();

    assert!(!engine.is_running());
    assert_eq!(report.fired, vec!["first"]);
    assert_eq!(*notifier.rung.lock().unwrap(), vec!["first"]);
}
