//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{FocusTimerEngine, Stats, TickOutcome, TimerMode, TimerState};
use crate::{tasks::TickScheduler, utils::ErrorReporter};

/// Timer state as published to watchers and clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub timer: TimerState,
    /// Remaining time as `MM:SS`
    pub display: String,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(timer: &TimerState) -> Self {
        Self {
            timer: timer.clone(),
            display: timer.display(),
        }
    }
}

/// Shared application state: the focus timer engine and its tick source
#[derive(Debug)]
pub struct AppState {
    engine: Mutex<FocusTimerEngine>,
    scheduler: TickScheduler,
    pub reporter: ErrorReporter,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create the state around a loaded engine, ticking once per second
    pub fn new(port: u16, host: String, engine: FocusTimerEngine, reporter: ErrorReporter) -> Self {
        Self::with_scheduler(port, host, engine, reporter, TickScheduler::per_second())
    }

    pub fn with_scheduler(
        port: u16,
        host: String,
        engine: FocusTimerEngine,
        reporter: ErrorReporter,
        scheduler: TickScheduler,
    ) -> Self {
        let (timer_update_tx, timer_update_rx) =
            watch::channel(TimerSnapshot::from(engine.timer()));

        Self {
            engine: Mutex::new(engine),
            scheduler,
            reporter,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, FocusTimerEngine>, String> {
        self.engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Apply a timer transition, publish the result and track it as the last
    /// action. The closure runs with the engine locked.
    fn update_timer<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut FocusTimerEngine),
    {
        let mut engine = self.lock_engine()?;
        updater(&mut engine);
        let snapshot = TimerSnapshot::from(engine.timer());
        drop(engine); // Release the lock early

        self.record_action(action);
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    /// Start the timer and arm the tick source. Starting a running timer
    /// changes nothing.
    pub fn start(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        self.update_timer("start", |engine| self.start_locked(engine))
    }

    /// Stop the timer and disarm the tick source
    pub fn pause(&self) -> Result<TimerSnapshot, String> {
        self.update_timer("pause", |engine| self.pause_locked(engine))
    }

    /// Start if stopped, pause if running. The decision and the transition
    /// happen under one engine lock.
    pub fn toggle(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        self.update_timer("toggle", |engine| {
            if engine.timer().running {
                self.pause_locked(engine);
            } else {
                self.start_locked(engine);
            }
        })
    }

    fn start_locked(self: &Arc<Self>, engine: &mut FocusTimerEngine) {
        if !engine.start() {
            return;
        }
        info!("Focus timer started in {} mode", engine.timer().mode);

        let weak = Arc::downgrade(self);
        let armed = self.scheduler.arm(move |generation| {
            weak.upgrade()
                .map(|state| state.handle_tick(generation))
                .unwrap_or(false)
        });
        if armed.is_none() {
            warn!("Tick source was already armed while the timer was stopped");
        }
    }

    fn pause_locked(&self, engine: &mut FocusTimerEngine) {
        if engine.pause() {
            info!("Focus timer paused at {}", engine.timer().display());
        }
        self.scheduler.disarm();
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.update_timer("reset", |engine| {
            engine.reset();
            self.scheduler.disarm();
            info!("Focus timer reset to {}", engine.timer().display());
        })
    }

    pub fn switch_mode(&self, mode: TimerMode) -> Result<TimerSnapshot, String> {
        self.update_timer(&format!("mode-{}", mode), |engine| {
            engine.switch_mode(mode);
            self.scheduler.disarm();
            info!("Focus timer switched to {} mode", mode);
        })
    }

    /// Apply a tick from the scheduler. Returns false once the tick source
    /// should stop.
    pub fn handle_tick(&self, generation: u64) -> bool {
        let mut engine = match self.lock_engine() {
            Ok(engine) => engine,
            Err(e) => {
                self.reporter.capture_error("timer", e);
                return false;
            }
        };

        // A pause/reset/switch may have disarmed us while this tick waited
        if !self.scheduler.is_current(generation) {
            debug!("Discarding stale tick from generation {}", generation);
            return false;
        }

        let outcome = engine.tick();
        let keep_ticking = match outcome {
            TickOutcome::Counting => true,
            TickOutcome::Completed(mode) => {
                info!("{} period finished", mode);
                self.scheduler.disarm();
                false
            }
            TickOutcome::Idle => {
                self.scheduler.disarm();
                false
            }
        };
        let snapshot = TimerSnapshot::from(engine.timer());
        drop(engine);

        if outcome != TickOutcome::Idle {
            self.publish(snapshot);
        }
        if let TickOutcome::Completed(mode) = outcome {
            self.record_action(&format!("{}-completed", mode));
        }
        keep_ticking
    }

    /// Count a completed task in today's stats
    pub fn record_task_completed(&self) -> Result<Stats, String> {
        let mut engine = self.lock_engine()?;
        engine.record_task_completed();
        let stats = engine.stats().clone();
        drop(engine);

        self.record_action("task-completed");
        Ok(stats)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.lock_engine().map(|engine| engine.timer().clone())
    }

    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock_engine().map(|engine| TimerSnapshot::from(engine.timer()))
    }

    /// Get today's stats
    pub fn get_stats(&self) -> Result<Stats, String> {
        self.lock_engine().map(|engine| engine.stats().clone())
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Pause the timer so the persisted state is final before exit
    pub fn shutdown(&self) -> Result<(), String> {
        self.pause()?;
        info!("Timer state flushed for shutdown");
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
