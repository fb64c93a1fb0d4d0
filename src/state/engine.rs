//! Focus timer engine: countdown state, daily stats and their persistence

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{
    stats::Stats,
    timer_state::{TickOutcome, TimerMode, TimerState, WORK_CREDIT_MINUTES},
};
use crate::{
    store::{keys, KeyValueStore},
    utils::ErrorReporter,
};

/// Owns the timer and stats and writes them through to the store after
/// every transition. Writes are best-effort: failures are reported, never
/// returned.
pub struct FocusTimerEngine {
    timer: TimerState,
    stats: Stats,
    store: Arc<dyn KeyValueStore>,
    reporter: ErrorReporter,
}

impl FocusTimerEngine {
    /// Restore the engine from `store`, applying the daily stats reset for
    /// `today`. Anything unreadable falls back to defaults.
    pub fn load(store: Arc<dyn KeyValueStore>, reporter: ErrorReporter, today: &str) -> Self {
        let stored_stats = read_json::<Stats>(store.as_ref(), keys::STATS);
        let stats = Stats::rollover(stored_stats, today);

        let timer = match read_json::<TimerState>(store.as_ref(), keys::TIMER) {
            Some(mut timer) if timer.is_valid() => {
                // Resumed timers never tick until started again
                timer.running = false;
                timer
            }
            Some(timer) => {
                warn!("Discarding out-of-range timer state: {:?}", timer);
                TimerState::new()
            }
            None => TimerState::new(),
        };

        info!(
            "Focus timer loaded: mode={}, remaining={}, focus={}min, tasks={}",
            timer.mode,
            timer.display(),
            stats.total_focus_time_minutes,
            stats.tasks_completed_today
        );

        let engine = Self {
            timer,
            stats,
            store,
            reporter,
        };
        engine.persist_stats();
        engine.persist_timer();
        engine
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Start counting down. Returns true if the timer was stopped before.
    pub fn start(&mut self) -> bool {
        let started = self.timer.start();
        if started {
            debug!("Timer started in {} mode at {}", self.timer.mode, self.timer.display());
            self.persist_timer();
        }
        started
    }

    /// Stop counting down. Returns true if the timer was running before.
    pub fn pause(&mut self) -> bool {
        let paused = self.timer.pause();
        if paused {
            debug!("Timer paused in {} mode at {}", self.timer.mode, self.timer.display());
            self.persist_timer();
        }
        paused
    }

    /// Apply one tick. Completing a work period credits a full pomodoro.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.timer.tick();
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Counting => self.persist_timer(),
            TickOutcome::Completed(mode) => {
                info!("{} period completed, switching to {}", mode, self.timer.mode);
                if mode == TimerMode::Work {
                    self.stats.record_focus_minutes(WORK_CREDIT_MINUTES);
                    info!("Total focus time today: {}", self.stats.focus_time_display());
                    self.persist_stats();
                }
                self.persist_timer();
            }
        }
        outcome
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        debug!("Timer reset to {} in {} mode", self.timer.display(), self.timer.mode);
        self.persist_timer();
    }

    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.timer.switch_mode(mode);
        debug!("Timer switched to {} mode", mode);
        self.persist_timer();
    }

    pub fn record_task_completed(&mut self) {
        self.stats.record_task_completed();
        info!("Tasks completed today: {}", self.stats.tasks_completed_today);
        self.persist_stats();
    }

    fn persist_timer(&self) {
        self.write_json(keys::TIMER, &self.timer);
    }

    fn persist_stats(&self) {
        self.write_json(keys::STATS, &self.stats);
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(key, &json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            self.reporter
                .capture_error("store", format!("Failed to persist {}: {}", key, e));
        }
    }
}

impl std::fmt::Debug for FocusTimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTimerEngine")
            .field("timer", &self.timer)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed {} entry: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read {} entry: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};

    const TODAY: &str = "Mon Oct 19 2026";

    fn fresh() -> (Arc<MemoryStore>, FocusTimerEngine) {
        let store = Arc::new(MemoryStore::new());
        let engine = FocusTimerEngine::load(store.clone(), ErrorReporter::new(), TODAY);
        (store, engine)
    }

    fn stored<T: DeserializeOwned>(store: &MemoryStore, key: &str) -> T {
        serde_json::from_str(&store.get(key).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn full_work_period_credits_twenty_five_minutes() {
        let (store, mut engine) = fresh();
        assert!(engine.start());

        for _ in 0..1499 {
            assert_eq!(engine.tick(), TickOutcome::Counting);
        }
        assert_eq!(engine.tick(), TickOutcome::Completed(TimerMode::Work));

        assert_eq!(engine.timer(), &TimerState::stopped(TimerMode::Break));
        assert_eq!(engine.stats().total_focus_time_minutes, 25);
        assert_eq!(stored::<Stats>(&store, keys::STATS).total_focus_time_minutes, 25);
        assert_eq!(
            stored::<TimerState>(&store, keys::TIMER),
            TimerState::stopped(TimerMode::Break)
        );
    }

    #[test]
    fn break_completion_leaves_focus_time() {
        let (_, mut engine) = fresh();
        engine.switch_mode(TimerMode::Break);
        engine.start();
        for _ in 0..300 {
            engine.tick();
        }
        assert_eq!(engine.timer(), &TimerState::stopped(TimerMode::Work));
        assert_eq!(engine.stats().total_focus_time_minutes, 0);
    }

    #[test]
    fn switch_mode_mid_work_does_not_credit() {
        let (_, mut engine) = fresh();
        engine.start();
        for _ in 0..600 {
            engine.tick();
        }
        assert_eq!(engine.timer().remaining_seconds, 900);

        engine.switch_mode(TimerMode::Break);
        assert_eq!(engine.timer(), &TimerState::stopped(TimerMode::Break));
        assert_eq!(engine.stats().total_focus_time_minutes, 0);
    }

    #[test]
    fn loads_todays_stats_and_resumes_timer_stopped() {
        let store = Arc::new(MemoryStore::with_entries([
            (
                keys::STATS,
                r#"{"date":"Mon Oct 19 2026","tasksCompletedToday":2,"totalFocusTimeMinutes":50}"#,
            ),
            (keys::TIMER, r#"{"mode":"break","remainingSeconds":120,"running":true}"#),
        ]));
        let engine = FocusTimerEngine::load(store, ErrorReporter::new(), TODAY);

        assert_eq!(engine.stats().tasks_completed_today, 2);
        assert_eq!(engine.stats().total_focus_time_minutes, 50);
        assert_eq!(
            engine.timer(),
            &TimerState {
                mode: TimerMode::Break,
                remaining_seconds: 120,
                running: false,
            }
        );
    }

    #[test]
    fn daily_rollover_zeroes_counters() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::STATS,
            r#"{"date":"Sun Oct 18 2026","tasksCompletedToday":5,"totalFocusTimeMinutes":120}"#,
        )]));
        let engine = FocusTimerEngine::load(store.clone(), ErrorReporter::new(), TODAY);

        assert_eq!(engine.stats(), &Stats::new(TODAY));
        assert_eq!(stored::<Stats>(&store, keys::STATS), Stats::new(TODAY));
    }

    #[test]
    fn malformed_entries_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::STATS, "{oops"),
            (keys::TIMER, r#"{"mode":"work","remainingSeconds":9999,"running":false}"#),
        ]));
        let engine = FocusTimerEngine::load(store, ErrorReporter::new(), TODAY);

        assert_eq!(engine.stats(), &Stats::new(TODAY));
        assert_eq!(engine.timer(), &TimerState::new());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Poisoned("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned("unavailable".to_string()))
        }
    }

    #[test]
    fn unavailable_store_is_reported_not_fatal() {
        let reporter = ErrorReporter::new();
        let mut engine = FocusTimerEngine::load(Arc::new(FailingStore), reporter.clone(), TODAY);
        engine.start();
        engine.tick();

        assert_eq!(engine.timer().remaining_seconds, 1499);
        assert!(!reporter.recent().is_empty());
        assert!(reporter.recent().iter().all(|e| e.source == "store"));
    }

    #[test]
    fn every_transition_writes_the_timer_through() {
        let (store, mut engine) = fresh();
        let persisted = || stored::<TimerState>(&store, keys::TIMER);

        engine.start();
        assert!(persisted().running);
        assert_eq!(&persisted(), engine.timer());

        engine.tick();
        assert_eq!(persisted().remaining_seconds, 1499);
        assert_eq!(&persisted(), engine.timer());

        engine.pause();
        assert_eq!(&persisted(), engine.timer());

        engine.start();
        engine.tick();
        engine.reset();
        assert_eq!(persisted(), TimerState::stopped(TimerMode::Work));
        assert_eq!(&persisted(), engine.timer());

        engine.switch_mode(TimerMode::Break);
        assert_eq!(persisted(), TimerState::stopped(TimerMode::Break));
        assert_eq!(&persisted(), engine.timer());
    }

    #[test]
    fn task_completion_is_persisted() {
        let (store, mut engine) = fresh();
        engine.record_task_completed();
        engine.record_task_completed();
        assert_eq!(stored::<Stats>(&store, keys::STATS).tasks_completed_today, 2);
    }
}
