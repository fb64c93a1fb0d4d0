//! Key-value persistence module
//!
//! The dashboard keeps all of its state in a flat string-keyed store holding
//! JSON values. This module defines the store contract and its backends.

pub mod json_file;
pub mod memory;

use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Fixed keys of the persisted layout
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const NOTES: &str = "notes";
    pub const HABITS: &str = "habits";
    pub const GOALS: &str = "goals";
    pub const STATS: &str = "stats";
    /// Mid-session resume of the focus timer
    pub const TIMER: &str = "timer";
}

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}

/// Flat string-keyed persistence. Absent keys read as `None`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
