//! State management module
//!
//! This module contains the focus timer, the daily stats and the shared
//! application state that drives them.

pub mod app_state;
pub mod engine;
pub mod stats;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerSnapshot};
pub use engine::FocusTimerEngine;
pub use stats::Stats;
pub use timer_state::{format_time, TickOutcome, TimerMode, TimerState};
