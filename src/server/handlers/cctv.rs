//! Camera directory and stream resolution handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::types::{
    AppState, ListResponse, Location, NearbyDebug, NearbyResponse, RefreshResponse,
    StreamResponse,
};
use crate::directory::RefreshOutcome;
use crate::models::ProviderField;
use crate::proximity::NearbyQuery;

/// Raw `/api/cctv/nearby` query parameters, validated by [`NearbyQuery::parse`]
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    lat: Option<String>,
    lng: Option<String>,
    radius: Option<String>,
}

/// Whole directory
pub async fn list_handler(State(service): State<AppState>) -> Json<ListResponse> {
    let snapshot = service.list_directory().await;
    let last_updated = service.cache_status().last_updated;
    Json(ListResponse {
        success: true,
        count: snapshot.len(),
        data: snapshot.records,
        cached: true,
        last_updated,
    })
}

/// Cameras near a point
pub async fn nearby_handler(
    State(service): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let query = NearbyQuery::parse(
        params.lat.as_deref(),
        params.lng.as_deref(),
        params.radius.as_deref(),
    )?;
    let (matches, snapshot) = service.query_nearby(&query).await;
    let status = service.cache_status();

    Ok(Json(NearbyResponse {
        success: true,
        count: matches.len(),
        data: matches,
        user_location: query,
        radius: query.radius_km,
        debug: NearbyDebug {
            total_cctv: snapshot.len(),
            cache_valid: status.is_valid,
            cache_last_updated: status.last_updated,
            timestamp: Utc::now(),
        },
    }))
}

/// Forced directory refresh
pub async fn refresh_handler(State(service): State<AppState>) -> Json<RefreshResponse> {
    let report = service.refresh_directory().await;
    let message = match report.outcome {
        RefreshOutcome::Committed(_) => "Directory updated",
        RefreshOutcome::AlreadyRefreshing => "Refresh already in progress, serving current directory",
        RefreshOutcome::KeptExisting => "Provider unavailable, kept existing directory",
        RefreshOutcome::InstalledFallback => "Provider unavailable, serving built-in cameras",
    };
    Json(RefreshResponse {
        success: true,
        message: message.to_string(),
        count: report.snapshot.len(),
        last_updated: service.cache_status().last_updated,
    })
}

/// Stream locator for one camera
pub async fn stream_handler(
    State(service): State<AppState>,
    Path(cctv_id): Path<String>,
) -> Result<Json<StreamResponse>, ApiError> {
    let resolved = service.resolve_stream(&cctv_id).await?;
    let location = Location {
        lat: resolved.metadata.get(ProviderField::YCoord),
        lng: resolved.metadata.get(ProviderField::XCoord),
    };
    let metadata = serde_json::to_value(&resolved.metadata).unwrap_or_default();

    Ok(Json(StreamResponse {
        success: true,
        cctv_id: resolved.camera_id,
        stream_url: resolved.locator.stream_page_url,
        kind: resolved.locator.kind,
        direct_video_url: resolved.locator.direct_video_url,
        player_type: resolved.locator.player_type,
        metadata,
        location,
    }))
}
