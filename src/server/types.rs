//! Response envelopes for the HTTP API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{CameraRecord, NearbyCamera, PlayerType};
use crate::proximity::NearbyQuery;
use crate::service::{CacheStatus, CctvService};

/// Shared state for the HTTP handlers
pub type AppState = Arc<CctvService>;

/// Every route the service answers, as (method, path).
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/api/cctv/list"),
    ("GET", "/api/cctv/nearby"),
    ("POST", "/api/cctv/refresh"),
    ("GET", "/api/cctv/:cctvId"),
    ("GET", "/api/cache/status"),
    ("GET", "/api/debug/routes"),
    ("GET", "/api/debug/cache"),
    ("GET", "/api/proxy"),
];

/// Endpoints formatted as `METHOD /path`
pub(crate) fn endpoint_list() -> Vec<String> {
    ENDPOINTS
        .iter()
        .map(|(method, path)| format!("{} {}", method, path))
        .collect()
}

/// JSON response for `/`
#[derive(Serialize)]
pub(crate) struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Vec<String>,
}

/// JSON response for `/health`
#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since startup
    pub uptime: f64,
    pub cache: HealthCache,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthCache {
    pub count: usize,
    pub valid: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// JSON response for `/api/cctv/list`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Arc<Vec<CameraRecord>>,
    pub cached: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// JSON response for `/api/cctv/nearby`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NearbyResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<NearbyCamera>,
    pub user_location: NearbyQuery,
    pub radius: f64,
    pub debug: NearbyDebug,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NearbyDebug {
    pub total_cctv: usize,
    pub cache_valid: bool,
    pub cache_last_updated: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

/// JSON response for `POST /api/cctv/refresh`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// JSON response for `/api/cctv/:cctvId`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreamResponse {
    pub success: bool,
    pub cctv_id: String,
    pub stream_url: String,
    pub kind: String,
    pub direct_video_url: Option<String>,
    pub player_type: PlayerType,
    pub metadata: Value,
    pub location: Location,
}

/// Camera position as reported in the provider metadata (textual, may be absent)
#[derive(Serialize)]
pub(crate) struct Location {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// JSON response for `/api/debug/routes`
#[derive(Serialize)]
pub(crate) struct RoutesResponse {
    pub success: bool,
    pub routes: Vec<RouteEntry>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub(crate) struct RouteEntry {
    pub path: &'static str,
    pub methods: Vec<&'static str>,
}

/// JSON response for `/api/debug/cache`
#[derive(Serialize)]
pub(crate) struct DebugCacheResponse {
    pub success: bool,
    pub cache: DebugCache,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DebugCache {
    #[serde(flatten)]
    pub status: CacheStatus,
    pub sample_data: Vec<CameraRecord>,
}
