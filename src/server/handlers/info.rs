//! Service information, health and route listing.

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::Json;
use chrono::Utc;

use super::super::error::ApiError;
use super::super::types::{
    endpoint_list, AppState, HealthCache, HealthResponse, RouteEntry, RoutesResponse, ServiceInfo,
    ENDPOINTS,
};

/// Service name and the endpoint list
pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        endpoints: endpoint_list(),
    })
}

/// Liveness plus a summary of the directory cache
pub async fn health_handler(State(service): State<AppState>) -> Json<HealthResponse> {
    let status = service.cache_status();
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        uptime: service.uptime().as_secs_f64(),
        cache: HealthCache {
            count: status.count,
            valid: status.is_valid,
            last_updated: status.last_updated,
        },
    })
}

/// Registered routes grouped by path
pub async fn routes_handler() -> Json<RoutesResponse> {
    let mut routes: Vec<RouteEntry> = Vec::new();
    for &(method, path) in ENDPOINTS {
        match routes.iter_mut().find(|r| r.path == path) {
            Some(entry) => entry.methods.push(method),
            None => routes.push(RouteEntry {
                path,
                methods: vec![method],
            }),
        }
    }
    Json(RoutesResponse {
        success: true,
        count: routes.len(),
        routes,
        timestamp: Utc::now(),
    })
}

/// Fallback for unmatched routes
pub async fn not_found_handler(method: Method, uri: Uri) -> ApiError {
    log::warn!("No route for {} {}", method, uri);
    ApiError::RouteNotFound {
        method: method.to_string(),
        uri: uri.to_string(),
    }
}
