//! Server lifecycle: startup, serving, graceful shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, API_KEY_ENV};
use crate::server;
use crate::service::CctvService;

/// Runs the proxy until Ctrl-C.
///
/// Startup order:
/// 1. Build the provider clients and the service
/// 2. Load the persisted directory; refresh in the background if it is stale
/// 3. Start the periodic refresh (first tick one cache TTL from now)
/// 4. Serve HTTP until a shutdown signal, then stop the scheduler
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built, the address cannot be
/// bound, or the server fails.
pub async fn run_server(config: Config) -> Result<()> {
    if config.api_key.is_empty() {
        log::warn!(
            "No provider API key configured (set {}); stream lookups will be rejected",
            API_KEY_ENV
        );
    }

    let service = Arc::new(CctvService::new(&config).context("Failed to initialize service")?);
    let shutdown = CancellationToken::new();
    let scheduler = service.start(shutdown.clone()).await;
    log::info!(
        "Directory refresh every {}s, snapshot at {}",
        config.cache_ttl_secs,
        config.snapshot_path.display()
    );

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received shutdown signal");
                signal.cancel();
            }
            Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    let result = server::serve(&config.bind, config.port, service, shutdown.clone()).await;
    shutdown_gracefully(shutdown, scheduler).await;
    result
}

/// Cancels background work and waits for the scheduler to stop.
///
/// A refresh that is mid-flight is abandoned with the task; the on-disk
/// snapshot is only ever replaced by a complete rename.
async fn shutdown_gracefully(cancel: CancellationToken, scheduler: JoinHandle<()>) {
    cancel.cancel();
    if let Err(e) = scheduler.await {
        log::warn!("Refresh scheduler ended abnormally: {}", e);
    }
    log::info!("Shutdown complete");
}
