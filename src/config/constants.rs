//! Configuration constants.
//!
//! This module defines the constants used throughout the service: provider
//! endpoints, cache lifetime, network timeouts and geographic defaults.

use std::time::Duration;

// Provider endpoints
/// Bulk export of the whole camera directory (Excel workbook).
pub const DIRECTORY_DOWNLOAD_URL: &str = "https://www.utic.go.kr/excel/download/OpenDataCCTV";
/// Per-camera metadata lookup. Takes `cctvId` and `key` query parameters.
pub const METADATA_URL: &str = "http://www.utic.go.kr/map/getCctvInfoById.do";
/// Secondary lookup that returns the raw video URL text for one camera.
pub const SECONDARY_VIDEO_URL: &str = "https://www.utic.go.kr/map/getCctvVideoUrl.do";
/// Host serving the generic stream viewer page.
pub const VIEWER_HOST: &str = "www.utic.go.kr";
/// Path of the generic stream viewer page on [`VIEWER_HOST`].
pub const VIEWER_PATH: &str = "/jsp/map/openDataCctvStream.jsp";

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "UTIC_API_KEY";

// Cache
/// Directory cache lifetime: 6 hours.
/// The scheduler refreshes on the same period.
pub const CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
/// Default location of the persisted directory snapshot
pub const SNAPSHOT_PATH: &str = "./cctv_cache.json";

// Network operation timeouts
/// Bulk directory download timeout in seconds (the export is several MB)
pub const DIRECTORY_TIMEOUT_SECS: u64 = 30;
/// Per-camera metadata lookup timeout in seconds
pub const METADATA_TIMEOUT_SECS: u64 = 15;
/// Secondary video URL lookup timeout in seconds
pub const SECONDARY_TIMEOUT_SECS: u64 = 15;
/// Relay fetch timeout in seconds
pub const RELAY_TIMEOUT_SECS: u64 = 60;

// Geography
/// Mean Earth radius in kilometers, used by the haversine distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Search radius used when the caller does not supply one
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

// Server
/// Port the HTTP server listens on by default
pub const DEFAULT_PORT: u16 = 3000;
/// Bind address by default (all interfaces)
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
/// Number of records included in the debug cache sample
pub const DEBUG_SAMPLE_SIZE: usize = 5;

/// Literal the upstream viewer script expects for a parameter it has no value for.
pub const UNDEFINED_SENTINEL: &str = "undefined";

/// `code` value the provider returns when it refuses to serve an id
pub const REJECTION_CODE: &str = "9999";
