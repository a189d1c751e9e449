//! cctv_proxy library: caching proxy for the UTIC open-data CCTV service
//!
//! This library keeps a locally refreshed directory of traffic cameras, answers
//! proximity queries against it, and resolves a camera id into a playable
//! stream locator by working through the provider's per-vendor quirks.
//!
//! # Example
//!
//! ```no_run
//! use cctv_proxy::{run_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     port: 8080,
//!     api_key: std::env::var("UTIC_API_KEY")?,
//!     ..Default::default()
//! };
//!
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The pieces can also be used on their own: [`CctvService`] exposes every
//! operation without HTTP, and [`server::router`] builds the axum router over it.
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod error_handling;
pub mod initialization;
pub mod models;
pub mod provider;
pub mod proximity;
pub mod relay;
pub mod resolver;
mod run;
pub mod server;
mod service;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use run::run_server;
pub use service::{CacheStatus, CctvService};
