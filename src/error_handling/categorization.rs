//! Error categorization.
//!
//! Maps raw `reqwest` failures onto [`UpstreamError`] so callers can tell a
//! timeout from a refused connection or a bad status.

use super::types::UpstreamError;

/// Categorizes a reqwest error.
///
/// Status errors (from `error_for_status`) keep their code and URL; timeouts are
/// reported separately from other transport failures.
pub fn categorize_reqwest_error(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        return UpstreamError::Timeout(error);
    }
    if let Some(status) = error.status() {
        return UpstreamError::Status {
            status: status.as_u16(),
            url: error
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
        };
    }
    if error.is_decode() {
        return UpstreamError::Malformed(error.to_string());
    }
    UpstreamError::Transport(error)
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        categorize_reqwest_error(error)
    }
}

impl UpstreamError {
    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}
