//! Error handling.
//!
//! This module provides:
//! - Error type definitions for every subsystem
//! - Categorization of `reqwest` failures into upstream error kinds
//!
//! Error types are grouped by how far they travel:
//! - **Absorbed**: `ParseError` and `UpstreamError` raised while refreshing the
//!   directory never reach a directory-query caller
//! - **Surfaced**: `QueryError`, `ResolveError` and `RelayError` are mapped
//!   to client-facing responses with the camera id or target attached

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{
    InitializationError, ParseError, QueryError, RelayError, ResolveError, UpstreamError,
};
