//! Media relay.
//!
//! Streams an upstream media response through to the caller, so browser
//! players can load provider streams that do not send CORS headers themselves
//! (the router's CORS layer adds them). Bodies are forwarded chunk by chunk as
//! they arrive.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use futures::TryStreamExt;
use url::{Host, Url};

use crate::config::{Config, FALLBACK_CONTENT_TYPE};
use crate::error_handling::{categorize_reqwest_error, InitializationError, RelayError};
use crate::initialization::init_client;

/// Validates a relay target: an absolute http(s) URL with a host.
pub fn parse_relay_target(raw: &str) -> Result<Url, RelayError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RelayError::InvalidInput(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(RelayError::InvalidInput(format!(
            "unsupported target {} (scheme {})",
            raw, scheme
        ))),
    }
}

/// Rejects targets that name this host or a private network.
///
/// Only literal addresses and `localhost` names are checked; a public name
/// that resolves to a private address is not caught here.
pub fn ensure_public_target(url: &Url) -> Result<(), RelayError> {
    let private = match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => is_private_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_private_ipv6(ip),
        None => true,
    };
    if private {
        return Err(RelayError::InvalidInput(format!(
            "{} points at a private or local address",
            url
        )));
    }
    Ok(())
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        // 0.0.0.0/8 and 240.0.0.0/4
        || ip.octets()[0] == 0
        || ip.octets()[0] >= 240
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (first & 0xffc0) == 0xfe80
}

/// Pass-through relay for media URLs.
#[derive(Debug, Clone)]
pub struct MediaRelay {
    client: reqwest::Client,
    timeout: Duration,
    allow_private_targets: bool,
}

impl MediaRelay {
    /// Builds the relay with the provider headers and the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        Ok(MediaRelay {
            client: init_client(config)?,
            timeout: Duration::from_secs(config.relay_timeout_secs),
            allow_private_targets: config.relay_allow_private_targets,
        })
    }

    /// Fetches `target` and streams it back.
    ///
    /// The upstream status and content type are forwarded as-is, error statuses
    /// included. Only a failure to get any response is an error.
    ///
    /// Private and loopback targets are refused unless the relay was built
    /// with `relay_allow_private_targets`.
    pub async fn relay(&self, target: &str) -> Result<Response, RelayError> {
        let url = parse_relay_target(target)?;
        if !self.allow_private_targets {
            ensure_public_target(&url)?;
        }
        log::debug!("Relaying {}", url);

        let upstream = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                log::error!("Relay fetch failed for {}: {}", url, e);
                RelayError::Transport(categorize_reqwest_error(e))
            })?;

        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            log::warn!("Relay target {} answered {}", url, status);
        }
        let content_type = upstream
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| HeaderValue::from_str(v).ok())
            .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

        let body = upstream
            .bytes_stream()
            .inspect_err(move |e| log::warn!("Relay stream from {} ended early: {}", url, e));
        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = status;
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        Ok(response)
    }
}
