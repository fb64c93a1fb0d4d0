//! Tick source with explicit arm/disarm

use std::{sync::Mutex, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error};

#[derive(Debug, Default)]
struct Armed {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Fires a callback once per period while armed.
///
/// Every arm and disarm bumps a generation counter. The callback receives the
/// generation it was armed with, so a tick that was already in flight when
/// the scheduler got disarmed can recognise itself as stale via
/// [`TickScheduler::is_current`] and discard itself.
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    armed: Mutex<Armed>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            armed: Mutex::new(Armed::default()),
        }
    }

    /// Scheduler ticking at 1 Hz
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Spawn the tick loop. The first tick fires one full period from now;
    /// the loop ends when `on_tick` returns false or on [`disarm`].
    ///
    /// Returns the armed generation, or `None` if already armed.
    ///
    /// [`disarm`]: TickScheduler::disarm
    pub fn arm<F>(&self, mut on_tick: F) -> Option<u64>
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        let mut armed = match self.armed.lock() {
            Ok(armed) => armed,
            Err(e) => {
                error!("Failed to lock tick scheduler: {}", e);
                return None;
            }
        };

        if armed.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Tick source already armed (generation {})", armed.generation);
            return None;
        }

        armed.generation += 1;
        let generation = armed.generation;
        let period = self.period;

        armed.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !on_tick(generation) {
                    break;
                }
            }
            debug!("Tick loop for generation {} finished", generation);
        }));

        debug!("Tick source armed (generation {})", generation);
        Some(generation)
    }

    /// Cancel the tick loop. Returns true if a loop was armed.
    pub fn disarm(&self) -> bool {
        let Ok(mut armed) = self.armed.lock() else {
            error!("Failed to lock tick scheduler for disarm");
            return false;
        };

        armed.generation += 1;
        match armed.handle.take() {
            Some(handle) => {
                handle.abort();
                debug!("Tick source disarmed");
                true
            }
            None => false,
        }
    }

    /// Check whether ticks from `generation` should still be applied
    pub fn is_current(&self, generation: u64) -> bool {
        self.armed
            .lock()
            .map(|armed| armed.generation == generation && armed.handle.is_some())
            .unwrap_or(false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
            .lock()
            .map(|armed| armed.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Ok(armed) = self.armed.get_mut() {
            if let Some(handle) = armed.handle.take() {
                handle.abort();
            }
        }
    }
}
