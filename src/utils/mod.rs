//! Utility functions module
//!
//! Error reporting and signal handling used throughout the application.

pub mod error_reporter;
pub mod signals;

// Re-export main items
pub use error_reporter::{CapturedError, ErrorReporter};
pub use signals::shutdown_signal;
