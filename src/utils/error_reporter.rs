//! Error reporting service
//!
//! Collects non-fatal errors (mostly failed persistence writes) so they can be
//! logged, shown to clients, and forwarded to registered listeners.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Maximum number of errors kept for display
pub const MAX_RECENT_ERRORS: usize = 50;

/// A captured error with its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    pub source: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

type ErrorCallback = Arc<dyn Fn(&CapturedError) + Send + Sync>;

/// Explicitly constructed error sink, shared by whoever needs to report
#[derive(Clone, Default)]
pub struct ErrorReporter {
    recent: Arc<Mutex<Vec<CapturedError>>>,
    callbacks: Arc<Mutex<Vec<ErrorCallback>>>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked for every captured error
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&CapturedError) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Record an error from `source`
    pub fn capture_error(&self, source: &str, message: impl Into<String>) {
        let captured = CapturedError {
            source: source.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        };
        error!("Error captured from {}: {}", captured.source, captured.message);

        if let Ok(mut recent) = self.recent.lock() {
            recent.push(captured.clone());
            if recent.len() > MAX_RECENT_ERRORS {
                let overflow = recent.len() - MAX_RECENT_ERRORS;
                recent.drain(..overflow);
            }
        }

        // Run listeners without the lock so they may register or report
        let callbacks = self
            .callbacks
            .lock()
            .map(|callbacks| callbacks.clone())
            .unwrap_or_default();
        for callback in callbacks {
            callback(&captured);
        }
    }

    /// Most recent errors, oldest first
    pub fn recent(&self) -> Vec<CapturedError> {
        self.recent.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("recent", &self.recent())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notifies_callbacks_and_keeps_recent() {
        let reporter = ErrorReporter::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        reporter.on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        reporter.capture_error("store", "disk full");
        reporter.capture_error("timer", "stale tick");

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        let recent = reporter.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].source, "timer");
    }

    #[test]
    fn callbacks_may_reenter_the_reporter() {
        let reporter = ErrorReporter::new();
        let inner = reporter.clone();
        reporter.on_error(move |captured| {
            if captured.source == "store" {
                inner.on_error(|_| {});
                inner.capture_error("listener", "follow-up");
            }
        });

        reporter.capture_error("store", "disk full");

        let sources: Vec<_> = reporter.recent().into_iter().map(|e| e.source).collect();
        assert_eq!(sources, ["store", "listener"]);
    }

    #[test]
    fn recent_is_bounded() {
        let reporter = ErrorReporter::new();
        for i in 0..(MAX_RECENT_ERRORS + 5) {
            reporter.capture_error("store", format!("error {}", i));
        }
        let recent = reporter.recent();
        assert_eq!(recent.len(), MAX_RECENT_ERRORS);
        assert_eq!(recent[0].message, "error 5");
    }
}
