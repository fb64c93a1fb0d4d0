//! Focus Dash - a local focus timer with persisted daily productivity stats
//!
//! This is the main entry point for the focus-dash daemon.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use focus_dash::{
    api::create_router,
    config::Config,
    state::{stats, AppState, FocusTimerEngine},
    store::{JsonFileStore, KeyValueStore, MemoryStore},
    utils::{shutdown_signal, ErrorReporter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_dash={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-dash v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Using in-memory state (--ephemeral)");
        Arc::new(MemoryStore::new())
    } else {
        let path = config.data_path();
        info!("Using state file {}", path.display());
        Arc::new(
            JsonFileStore::open(&path)
                .with_context(|| format!("Failed to open state file {}", path.display()))?,
        )
    };

    // Create application state
    let reporter = ErrorReporter::new();
    let engine = FocusTimerEngine::load(store, reporter.clone(), &stats::today());
    let state = Arc::new(AppState::new(config.port, config.host.clone(), engine, reporter));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start            - Start the countdown");
    info!("  POST /timer/pause            - Pause the countdown");
    info!("  POST /timer/toggle           - Start or pause");
    info!("  POST /timer/reset            - Restore the current mode's duration");
    info!("  POST /timer/mode/:mode       - Switch to work or break");
    info!("  GET  /timer                  - Current countdown");
    info!("  GET  /stats                  - Today's stats");
    info!("  POST /stats/tasks/completed  - Count a completed task");
    info!("  GET  /status                 - Timer, stats and errors");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            if let Err(e) = signal {
                tracing::error!("Signal handling failed: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.shutdown() {
        tracing::error!("Failed to flush timer state: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
