//! Directory cache inspection.

use axum::extract::State;
use axum::Json;

use super::super::types::{AppState, DebugCache, DebugCacheResponse};
use crate::config::DEBUG_SAMPLE_SIZE;
use crate::service::CacheStatus;

/// Directory cache state
pub async fn cache_status_handler(State(service): State<AppState>) -> Json<CacheStatus> {
    Json(service.cache_status())
}

/// Cache status plus the first few records
pub async fn debug_cache_handler(State(service): State<AppState>) -> Json<DebugCacheResponse> {
    let snapshot = service.current_directory();
    Json(DebugCacheResponse {
        success: true,
        cache: DebugCache {
            status: service.cache_status(),
            sample_data: snapshot
                .records
                .iter()
                .take(DEBUG_SAMPLE_SIZE)
                .cloned()
                .collect(),
        },
    })
}
