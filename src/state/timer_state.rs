//! Focus timer state and its transitions

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Length of a work period in seconds (25 minutes)
pub const WORK_DURATION_SECONDS: u64 = 25 * 60;
/// Length of a break period in seconds (5 minutes)
pub const BREAK_DURATION_SECONDS: u64 = 5 * 60;
/// Focus minutes awarded for one completed work period
pub const WORK_CREDIT_MINUTES: u32 = 25;

/// The two timer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    /// Full length of a period in this mode
    pub fn duration_seconds(self) -> u64 {
        match self {
            TimerMode::Work => WORK_DURATION_SECONDS,
            TimerMode::Break => BREAK_DURATION_SECONDS,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TimerMode::Work),
            "break" => Ok(TimerMode::Break),
            other => Err(format!("Unknown timer mode: {}", other)),
        }
    }
}

/// Result of applying a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was stopped, nothing changed
    Idle,
    /// One second was counted down
    Counting,
    /// The period in the given mode just finished
    Completed(TimerMode),
}

/// Countdown state of the focus timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
}

impl TimerState {
    /// Create a stopped timer at the full work duration
    pub fn new() -> Self {
        Self::stopped(TimerMode::Work)
    }

    /// Create a stopped timer at the full duration of `mode`
    pub fn stopped(mode: TimerMode) -> Self {
        Self {
            mode,
            remaining_seconds: mode.duration_seconds(),
            running: false,
        }
    }

    /// Check the remaining time is within the mode's bounds
    pub fn is_valid(&self) -> bool {
        self.remaining_seconds <= self.mode.duration_seconds()
    }

    /// Start counting down. Returns true if the timer was stopped before.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        if self.remaining_seconds == 0 {
            self.remaining_seconds = self.mode.duration_seconds();
        }
        self.running = true;
        true
    }

    /// Stop counting down. Returns true if the timer was running before.
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Count down one second.
    ///
    /// The tick that finishes a period flips to the other mode at its full
    /// duration and stops; it never keeps running into the next period.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        if self.remaining_seconds > 1 {
            self.remaining_seconds -= 1;
            return TickOutcome::Counting;
        }

        let completed = self.mode;
        *self = Self::stopped(completed.opposite());
        TickOutcome::Completed(completed)
    }

    /// Restore the current mode's full duration and stop
    pub fn reset(&mut self) {
        *self = Self::stopped(self.mode);
    }

    /// Jump to `mode` at its full duration and stop
    pub fn switch_mode(&mut self, mode: TimerMode) {
        *self = Self::stopped(mode);
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format_time(self.remaining_seconds)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render seconds as zero-padded `MM:SS`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(mode: TimerMode, remaining_seconds: u64) -> TimerState {
        TimerState {
            mode,
            remaining_seconds,
            running: true,
        }
    }

    #[test]
    fn default_is_stopped_work() {
        let state = TimerState::default();
        assert_eq!(state.mode, TimerMode::Work);
        assert_eq!(state.remaining_seconds, 1500);
        assert!(!state.running);
    }

    #[test]
    fn tick_counts_down_for_every_remaining_above_one() {
        for mode in [TimerMode::Work, TimerMode::Break] {
            for r in 2..=mode.duration_seconds() {
                let mut state = running(mode, r);
                assert_eq!(state.tick(), TickOutcome::Counting);
                assert_eq!(state, running(mode, r - 1));
            }
        }
    }

    #[test]
    fn final_tick_switches_to_opposite_mode_and_stops() {
        let mut state = running(TimerMode::Work, 1);
        assert_eq!(state.tick(), TickOutcome::Completed(TimerMode::Work));
        assert_eq!(state, TimerState::stopped(TimerMode::Break));

        let mut state = running(TimerMode::Break, 1);
        assert_eq!(state.tick(), TickOutcome::Completed(TimerMode::Break));
        assert_eq!(state, TimerState::stopped(TimerMode::Work));
    }

    #[test]
    fn tick_on_stopped_timer_is_idle() {
        let mut state = TimerState::stopped(TimerMode::Break);
        state.remaining_seconds = 42;
        let before = state.clone();
        assert_eq!(state.tick(), TickOutcome::Idle);
        assert_eq!(state, before);
    }

    #[test]
    fn start_and_pause_are_idempotent_on_running_flag() {
        let mut state = running(TimerMode::Work, 900);
        assert!(!state.start());
        assert_eq!(state.remaining_seconds, 900);

        assert!(state.pause());
        assert!(!state.pause());
        assert!(state.start());
        assert_eq!(state, running(TimerMode::Work, 900));
    }

    #[test]
    fn start_from_zero_restores_full_duration() {
        let mut state = TimerState {
            mode: TimerMode::Break,
            remaining_seconds: 0,
            running: false,
        };
        assert!(state.start());
        assert_eq!(state.remaining_seconds, 300);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = running(TimerMode::Break, 12);
        once.reset();
        let mut twice = once.clone();
        twice.reset();
        assert_eq!(once, twice);
        assert_eq!(once, TimerState::stopped(TimerMode::Break));
    }

    #[test]
    fn switch_mode_while_running_stops() {
        let mut state = running(TimerMode::Work, 900);
        state.switch_mode(TimerMode::Break);
        assert_eq!(state, TimerState::stopped(TimerMode::Break));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(TimerState::default().display(), "25:00");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Work".parse::<TimerMode>(), Ok(TimerMode::Work));
        assert_eq!(" BREAK ".parse::<TimerMode>(), Ok(TimerMode::Break));
        assert!("nap".parse::<TimerMode>().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&TimerState::default()).unwrap();
        assert_eq!(json, r#"{"mode":"work","remainingSeconds":1500,"running":false}"#);
    }

    #[test]
    fn rejects_remaining_above_mode_duration() {
        let state = TimerState {
            mode: TimerMode::Break,
            remaining_seconds: 301,
            running: false,
        };
        assert!(!state.is_valid());
    }
}
