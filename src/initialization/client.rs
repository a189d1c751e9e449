//! HTTP client initialization.
//!
//! This module provides functions to initialize the reqwest clients used to
//! talk to the provider and to relay media.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::ClientBuilder;

use crate::config::{Config, PROVIDER_REFERER, PROVIDER_USER_AGENT};
use crate::error_handling::InitializationError;

/// TCP connect timeout applied to every client
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Headers the provider expects on every request.
fn provider_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(PROVIDER_REFERER));
    headers.insert(USER_AGENT, HeaderValue::from_static(PROVIDER_USER_AGENT));
    headers
}

fn base_builder(config: &Config) -> ClientBuilder {
    // Per-call timeouts are set on each request; this caps anything that forgets to
    let ceiling = config
        .directory_timeout_secs
        .max(config.metadata_timeout_secs)
        .max(config.secondary_timeout_secs)
        .max(config.relay_timeout_secs);

    ClientBuilder::new()
        .default_headers(provider_headers())
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(ceiling))
}

/// Initializes the HTTP client used for metadata lookups and the media relay.
///
/// Creates a `reqwest::Client` configured with:
/// - The provider's expected Referer and User-Agent as default headers
/// - A connect timeout, and an overall timeout no shorter than any per-call one
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    Ok(base_builder(config).build()?)
}

/// Initializes the HTTP client used for the bulk directory export.
///
/// The export host serves a certificate chain that fails verification, so
/// this client accepts invalid certificates. It is only ever pointed at the
/// configured export URL.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_insecure_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    Ok(base_builder(config)
        .danger_accept_invalid_certs(true)
        .build()?)
}
