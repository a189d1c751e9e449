//! HTTP handlers.

mod cache;
mod cctv;
mod info;
mod proxy;

pub use cache::{cache_status_handler, debug_cache_handler};
pub use cctv::{list_handler, nearby_handler, refresh_handler, stream_handler};
pub use info::{health_handler, not_found_handler, root_handler, routes_handler};
pub use proxy::proxy_handler;
