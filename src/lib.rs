//! Focus Dash - a local focus timer with persisted daily productivity stats
//!
//! This library provides the work/break focus timer engine, the key-value
//! persistence it writes through to, the tick source driving it, and an HTTP
//! control surface for dashboards.

pub mod api;
pub mod config;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, FocusTimerEngine, Stats, TimerMode, TimerState};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use utils::{shutdown_signal, ErrorReporter};
