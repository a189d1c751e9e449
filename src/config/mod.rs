//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, timeouts, cache lifetime)
//! - HTTP header constants for the provider and for relayed responses
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
