//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    API_KEY_ENV, CACHE_TTL, DEFAULT_BIND_ADDRESS, DEFAULT_PORT, DIRECTORY_DOWNLOAD_URL,
    DIRECTORY_TIMEOUT_SECS, METADATA_TIMEOUT_SECS, METADATA_URL, RELAY_TIMEOUT_SECS,
    SECONDARY_TIMEOUT_SECS, SECONDARY_VIDEO_URL, SNAPSHOT_PATH, VIEWER_HOST,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Parsed from the command line (with environment fallbacks) by the binary,
/// or constructed programmatically by library users and tests.
///
/// # Examples
///
/// ```no_run
/// use cctv_proxy::Config;
///
/// let config = Config {
///     port: 8080,
///     api_key: "my-key".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cctv_proxy",
    about = "Caching proxy for the UTIC open-data CCTV service."
)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Where the directory snapshot is persisted between runs
    #[arg(long, value_parser, default_value = SNAPSHOT_PATH)]
    pub snapshot_path: PathBuf,

    /// Directory cache lifetime in seconds (also the scheduled refresh period)
    #[arg(long, default_value_t = CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Provider API key, passed through on metadata and viewer requests
    #[arg(long, env = API_KEY_ENV, default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Bulk directory export URL
    #[arg(long, env = "UTIC_DIRECTORY_URL", default_value = DIRECTORY_DOWNLOAD_URL)]
    pub directory_url: String,

    /// Per-camera metadata endpoint
    #[arg(long, env = "UTIC_METADATA_URL", default_value = METADATA_URL)]
    pub metadata_url: String,

    /// Secondary video URL lookup endpoint
    #[arg(long, env = "UTIC_SECONDARY_URL", default_value = SECONDARY_VIDEO_URL)]
    pub secondary_url: String,

    /// Host serving the generic stream viewer page
    #[arg(long, default_value = VIEWER_HOST)]
    pub viewer_host: String,

    /// Camera kinds whose direct video URL comes from the secondary lookup
    #[arg(long, value_delimiter = ',', default_value = "E")]
    pub secondary_kinds: Vec<String>,

    /// Directory download timeout in seconds
    #[arg(long, default_value_t = DIRECTORY_TIMEOUT_SECS)]
    pub directory_timeout_secs: u64,

    /// Metadata lookup timeout in seconds
    #[arg(long, default_value_t = METADATA_TIMEOUT_SECS)]
    pub metadata_timeout_secs: u64,

    /// Secondary video URL lookup timeout in seconds
    #[arg(long, default_value_t = SECONDARY_TIMEOUT_SECS)]
    pub secondary_timeout_secs: u64,

    /// Relay fetch timeout in seconds
    #[arg(long, default_value_t = RELAY_TIMEOUT_SECS)]
    pub relay_timeout_secs: u64,

    /// Let the media relay fetch loopback and private-network addresses
    #[arg(long)]
    pub relay_allow_private_targets: bool,
}

impl Config {
    /// Directory cache lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            snapshot_path: PathBuf::from(SNAPSHOT_PATH),
            cache_ttl_secs: CACHE_TTL.as_secs(),
            api_key: String::new(),
            directory_url: DIRECTORY_DOWNLOAD_URL.to_string(),
            metadata_url: METADATA_URL.to_string(),
            secondary_url: SECONDARY_VIDEO_URL.to_string(),
            viewer_host: VIEWER_HOST.to_string(),
            secondary_kinds: vec!["E".to_string()],
            directory_timeout_secs: DIRECTORY_TIMEOUT_SECS,
            metadata_timeout_secs: METADATA_TIMEOUT_SECS,
            secondary_timeout_secs: SECONDARY_TIMEOUT_SECS,
            relay_timeout_secs: RELAY_TIMEOUT_SECS,
            relay_allow_private_targets: false,
        }
    }
}
