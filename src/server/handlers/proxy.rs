//! Media relay handlers.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::types::AppState;
use crate::error_handling::RelayError;

/// `/api/proxy` query parameters
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    url: Option<String>,
}

/// Streams `?url=` through
pub async fn proxy_handler(
    State(service): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, ApiError> {
    let target = params
        .url
        .ok_or_else(|| RelayError::InvalidInput("missing url parameter".to_string()))?;
    Ok(service.relay_media(&target).await?)
}

