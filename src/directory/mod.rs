//! Camera directory cache.
//!
//! This module owns the locally cached copy of the provider's camera list:
//! - Parsing the bulk export (`parse`)
//! - The in-memory store with its staleness clock and refresh gate (`store`)
//! - Write-through persistence to a JSON snapshot file (`persist`)
//! - Single-flight refresh with stale-but-available degrade (`refresh`)
//! - Built-in cameras for a first run with an unreachable provider (`seed`)

mod parse;
mod persist;
mod refresh;
mod seed;
mod store;

pub use parse::{parse_directory, try_parse_directory};
pub use refresh::{spawn_refresh_scheduler, DirectoryRefresher, RefreshOutcome, RefreshReport};
pub use seed::seed_cameras;
pub use store::{DirectoryStore, RefreshGuard};
