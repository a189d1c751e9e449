//! Error type definitions.
//!
//! This module defines the error types produced by each subsystem. Directory
//! errors (`ParseError`, `UpstreamError` during refresh) are absorbed by the
//! refresher; resolution and relay errors surface to the route layer.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failure talking to the provider or to a relayed media endpoint.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request did not complete within its timeout.
    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] ReqwestError),

    /// Connection, TLS or body transfer failure.
    #[error("Upstream transport error: {0}")]
    Transport(#[source] ReqwestError),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code returned by the upstream
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// The response arrived but its body could not be understood.
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

/// The directory document could not be read at all.
///
/// Individual bad rows never produce this error; they are dropped.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The workbook container could not be opened.
    #[error("Unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook has no first sheet.
    #[error("Workbook contains no sheets")]
    NoSheet,

    /// The CSV rendition could not be read.
    #[error("Unreadable CSV document: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a column the records need.
    #[error("Missing required column {0}")]
    MissingColumn(&'static str),

    /// The document has no header row.
    #[error("Document is empty")]
    Empty,
}

/// Caller-supplied proximity query parameters are unusable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A required parameter was not supplied.
    #[error("Missing required parameter {0}")]
    MissingParameter(&'static str),

    /// A parameter is not a finite number (or is out of range).
    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber {
        /// Parameter name
        name: &'static str,
        /// Value as supplied
        value: String,
    },
}

/// Errors resolving a camera id into a stream locator.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The camera id supplied by the caller is unusable.
    #[error("Invalid camera id: {0:?}")]
    InvalidInput(String),

    /// The provider explicitly refused to serve this id.
    #[error("Provider rejected camera {camera_id}: {message}")]
    UpstreamRejected {
        /// Requested camera id
        camera_id: String,
        /// Provider's own message, if any
        message: String,
    },

    /// The provider could not be reached or answered with garbage.
    #[error("Provider unreachable for camera {camera_id}: {source}")]
    UpstreamUnreachable {
        /// Requested camera id
        camera_id: String,
        /// Underlying transport failure
        #[source]
        source: UpstreamError,
    },

    /// The provider answered, but with no record for this id.
    #[error("No metadata for camera {camera_id}")]
    NotFound {
        /// Requested camera id
        camera_id: String,
    },
}

impl ResolveError {
    /// Camera id the error refers to.
    pub fn camera_id(&self) -> &str {
        match self {
            ResolveError::InvalidInput(id) => id,
            ResolveError::UpstreamRejected { camera_id, .. }
            | ResolveError::UpstreamUnreachable { camera_id, .. }
            | ResolveError::NotFound { camera_id } => camera_id,
        }
    }
}

/// Errors relaying a media stream.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The relay target is not an absolute http(s) URL.
    #[error("Invalid relay target: {0}")]
    InvalidInput(String),

    /// The relay target could not be fetched.
    #[error("Relay fetch failed: {0}")]
    Transport(#[from] UpstreamError),
}
