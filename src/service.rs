//! The operations the HTTP layer exposes, over one shared set of components.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::directory::{spawn_refresh_scheduler, DirectoryRefresher, DirectoryStore, RefreshReport};
use crate::error_handling::{InitializationError, RelayError, ResolveError};
use crate::models::{DirectorySnapshot, NearbyCamera};
use crate::provider::{Provider, UticClient};
use crate::proximity::{nearby, NearbyQuery};
use crate::relay::MediaRelay;
use crate::resolver::{ResolvedStream, StreamResolver};

/// Directory cache state as reported by the status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// Records in the directory
    pub count: usize,
    /// `None` until the first successful fetch
    pub last_updated: Option<DateTime<Utc>>,
    /// Fetched within the cache TTL
    pub is_valid: bool,
    /// A refresh is in flight
    pub is_loading: bool,
    /// When the cache expires; `None` until the first successful fetch
    pub next_update: Option<DateTime<Utc>>,
}

/// The CCTV proxy service.
///
/// Cheap to share behind an `Arc`; every operation takes `&self`.
pub struct CctvService {
    store: Arc<DirectoryStore>,
    refresher: Arc<DirectoryRefresher>,
    resolver: StreamResolver,
    relay: MediaRelay,
    cache_ttl: Duration,
    started_at: Instant,
}

impl CctvService {
    /// Builds the service against the real provider.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if an HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        let provider: Arc<dyn Provider> = Arc::new(UticClient::new(config)?);
        let store = DirectoryStore::new(config.snapshot_path.clone());
        Self::with_provider(config, provider, store)
    }

    /// Builds the service over any provider and store.
    pub fn with_provider(
        config: &Config,
        provider: Arc<dyn Provider>,
        store: DirectoryStore,
    ) -> Result<Self, InitializationError> {
        let store = Arc::new(store);
        Ok(CctvService {
            refresher: Arc::new(DirectoryRefresher::new(
                Arc::clone(&store),
                Arc::clone(&provider),
            )),
            resolver: StreamResolver::from_config(provider, config),
            relay: MediaRelay::new(config)?,
            store,
            cache_ttl: config.cache_ttl(),
            started_at: Instant::now(),
        })
    }

    /// Loads the persisted directory and starts the background refresh work.
    ///
    /// A stale or missing directory is refreshed right away in the background;
    /// after that the scheduler refreshes once per cache TTL until `shutdown`
    /// is cancelled. Returns the scheduler's handle.
    pub async fn start(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let loaded = self.store.hydrate().await;
        if loaded > 0 {
            log::info!("Serving {} cameras from the persisted snapshot", loaded);
        }
        let _ = self.refresher.refresh_in_background_if_stale(self.cache_ttl);
        spawn_refresh_scheduler(Arc::clone(&self.refresher), self.cache_ttl, shutdown)
    }

    /// Directory cache lifetime
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Time since the service was built
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Current directory without triggering anything.
    pub fn current_directory(&self) -> DirectorySnapshot {
        self.store.current()
    }

    /// Whether the directory was fetched within the cache TTL
    pub fn is_cache_valid(&self) -> bool {
        self.store.is_valid(Utc::now(), self.cache_ttl)
    }

    /// The directory for serving.
    ///
    /// An empty directory is refreshed before answering. A stale one is
    /// served as-is while a background refresh runs.
    pub async fn list_directory(&self) -> DirectorySnapshot {
        let current = self.store.current();
        if current.is_empty() {
            return self.refresher.refresh().await.snapshot;
        }
        let _ = self.refresher.refresh_in_background_if_stale(self.cache_ttl);
        current
    }

    /// Cameras near the query point, nearest first, with the directory they came from.
    pub async fn query_nearby(&self, query: &NearbyQuery) -> (Vec<NearbyCamera>, DirectorySnapshot) {
        let snapshot = self.list_directory().await;
        let matches = nearby(query, &snapshot);
        log::debug!(
            "{} of {} cameras within {} km of ({}, {})",
            matches.len(),
            snapshot.len(),
            query.radius_km,
            query.lat,
            query.lng
        );
        (matches, snapshot)
    }

    /// Forces a directory refresh (or joins the view of one in flight).
    pub async fn refresh_directory(&self) -> RefreshReport {
        self.refresher.refresh().await
    }

    /// Resolves a camera id into a stream locator.
    pub async fn resolve_stream(&self, camera_id: &str) -> Result<ResolvedStream, ResolveError> {
        self.resolver.resolve(camera_id).await
    }

    /// Streams a media URL through with CORS headers.
    pub async fn relay_media(&self, target: &str) -> Result<Response, RelayError> {
        self.relay.relay(target).await
    }

    /// Directory cache state.
    pub fn cache_status(&self) -> CacheStatus {
        let snapshot = self.store.current();
        let fetched = snapshot.fetched_at != DateTime::<Utc>::UNIX_EPOCH;
        let next_update = chrono::Duration::from_std(self.cache_ttl)
            .ok()
            .filter(|_| fetched)
            .and_then(|ttl| snapshot.fetched_at.checked_add_signed(ttl));
        CacheStatus {
            count: snapshot.len(),
            last_updated: fetched.then_some(snapshot.fetched_at),
            is_valid: self.is_cache_valid(),
            is_loading: snapshot.refreshing,
            next_update,
        }
    }
}
