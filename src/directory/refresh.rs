//! Directory refresh: download, parse, then commit or degrade.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::parse::parse_directory;
use super::seed::seed_cameras;
use super::store::DirectoryStore;
use crate::models::DirectorySnapshot;
use crate::provider::Provider;

/// What a refresh did to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh records were committed (and persisted).
    Committed(usize),
    /// Another refresh held the gate; nothing was fetched.
    AlreadyRefreshing,
    /// The fetch failed or was empty; the existing records were kept.
    KeptExisting,
    /// The fetch failed with an empty directory; the built-in cameras were installed.
    InstalledFallback,
}

/// Outcome of a refresh together with the directory it left behind.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// What the refresh did
    pub outcome: RefreshOutcome,
    /// Directory as it stands after the refresh
    pub snapshot: DirectorySnapshot,
}

/// Keeps the directory store up to date from the provider's bulk export.
///
/// At most one refresh runs at a time. A caller that finds a refresh in flight
/// gets the current directory back immediately instead of waiting.
pub struct DirectoryRefresher {
    store: Arc<DirectoryStore>,
    provider: Arc<dyn Provider>,
}

impl DirectoryRefresher {
    /// Refresher committing into `store` what `provider` downloads.
    pub fn new(store: Arc<DirectoryStore>, provider: Arc<dyn Provider>) -> Self {
        DirectoryRefresher { store, provider }
    }

    /// Runs one refresh, or returns the current directory if one is already running.
    pub async fn refresh(&self) -> RefreshReport {
        let Some(guard) = self.store.try_begin_refresh() else {
            log::info!("Directory refresh already in progress, serving current directory");
            return RefreshReport {
                outcome: RefreshOutcome::AlreadyRefreshing,
                snapshot: self.store.current(),
            };
        };

        log::info!("Refreshing camera directory");
        let fetched = match self.provider.fetch_directory_snapshot().await {
            Ok(bytes) => {
                // Workbook decoding is CPU-bound
                match tokio::task::spawn_blocking(move || parse_directory(&bytes)).await {
                    Ok(records) => records,
                    Err(e) => {
                        log::error!("Directory parsing task failed: {}", e);
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                log::error!("Directory download failed: {}", e);
                Vec::new()
            }
        };

        let outcome = if !fetched.is_empty() {
            let count = fetched.len();
            self.store.replace(fetched, Utc::now()).await;
            log::info!("Camera directory updated: {} cameras", count);
            RefreshOutcome::Committed(count)
        } else if !self.store.current().is_empty() {
            log::warn!("No cameras fetched, keeping existing directory");
            RefreshOutcome::KeptExisting
        } else {
            let seed = seed_cameras();
            log::warn!(
                "No cameras fetched and directory is empty, installing {} built-in cameras",
                seed.len()
            );
            self.store.install_fallback(seed);
            RefreshOutcome::InstalledFallback
        };

        drop(guard);
        RefreshReport {
            outcome,
            snapshot: self.store.current(),
        }
    }

    /// Starts a background refresh if the directory is stale and no refresh is running.
    ///
    /// Returns the handle of the spawned refresh, if one was started.
    pub fn refresh_in_background_if_stale(
        self: &Arc<Self>,
        ttl: Duration,
    ) -> Option<JoinHandle<RefreshReport>> {
        if self.store.is_valid(Utc::now(), ttl) || self.store.is_refreshing() {
            return None;
        }
        log::info!("Directory is stale, refreshing in the background");
        let refresher = Arc::clone(self);
        Some(tokio::spawn(async move { refresher.refresh().await }))
    }
}

/// Spawns the periodic refresh task.
///
/// The first tick fires one `period` after start. Ticks funnel through the same
/// gate as request-driven refreshes. The task ends when `shutdown` is cancelled.
pub fn spawn_refresh_scheduler(
    refresher: Arc<DirectoryRefresher>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log::info!("Scheduled directory refresh");
                    let report = refresher.refresh().await;
                    log::debug!("Scheduled refresh finished: {:?}", report.outcome);
                }
                _ = shutdown.cancelled() => {
                    log::debug!("Directory refresh scheduler shutting down");
                    break;
                }
            }
        }
    })
}
