//! Mapping of service errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error_handling::{QueryError, RelayError, ResolveError};
use crate::server::types::endpoint_list;

/// Error returned by a handler. Rendered as a `{ success: false, ... }` envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad `/api/cctv/nearby` parameters
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Stream resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Relay target refused or unreachable
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// No route matched
    #[error("No route for {method} {uri}")]
    RouteNotFound {
        /// Request method
        method: String,
        /// Request URI as received
        uri: String,
    },
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Resolve(ResolveError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Resolve(ResolveError::UpstreamRejected { .. }) => StatusCode::FORBIDDEN,
            ApiError::Resolve(ResolveError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Resolve(ResolveError::UpstreamUnreachable { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Relay(RelayError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Relay(RelayError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Query(_) => json!({
                "success": false,
                "error": self.to_string(),
                "required": ["lat", "lng"],
                "optional": ["radius"],
            }),
            ApiError::Resolve(ResolveError::UpstreamRejected { camera_id, message }) => json!({
                "success": false,
                "error": "Provider rejected the camera id",
                "details": message,
                "cctvId": camera_id,
            }),
            ApiError::Resolve(err) => json!({
                "success": false,
                "error": err.to_string(),
                "cctvId": err.camera_id(),
            }),
            ApiError::Relay(err) => json!({
                "success": false,
                "error": err.to_string(),
            }),
            ApiError::RouteNotFound { method, uri } => json!({
                "success": false,
                "error": "Endpoint not found",
                "method": method,
                "url": uri,
                "availableEndpoints": endpoint_list(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
