//! Background tasks module
//!
//! This module contains the tick source that drives the focus timer.

pub mod tick_scheduler;

// Re-export main types
pub use tick_scheduler::TickScheduler;
