//! HTTP header values sent to the provider and returned to relay callers.

/// Referer the provider checks on every request.
pub const PROVIDER_REFERER: &str = "https://www.utic.go.kr/guide/cctvOpenData.do";

/// User-Agent the provider accepts. Requests without a browser-like agent are
/// answered with an HTML error page instead of data.
pub const PROVIDER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Content type used when the relayed upstream response does not declare one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
