//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT) and return it
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let handle = signals.handle();

    let signal = signals
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("Signal stream closed before a shutdown signal"))?;
    info!("Received signal: {}", signal);

    handle.close();
    Ok(signal)
}
