//! Upstream provider access.
//!
//! The [`Provider`] trait is the seam between the service logic and the
//! network: the refresher pulls the bulk directory through it and the resolver
//! pulls per-camera metadata and secondary video URLs. [`UticClient`] is the
//! reqwest-backed implementation used in production.

mod client;
#[cfg(test)]
pub(crate) mod test_helpers;

use async_trait::async_trait;

use crate::error_handling::UpstreamError;
use crate::models::RawProviderRecord;

pub use client::{ProviderEndpoints, UticClient};

/// Calls the service makes to the upstream CCTV provider.
///
/// Every call is independent and may run concurrently with any other.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Downloads the bulk directory export.
    async fn fetch_directory_snapshot(&self) -> Result<Vec<u8>, UpstreamError>;

    /// Fetches the metadata record for one camera.
    async fn fetch_camera_metadata(
        &self,
        camera_id: &str,
        api_key: &str,
    ) -> Result<RawProviderRecord, UpstreamError>;

    /// Looks up the raw video URL text for one camera, keyed by its IP or id field.
    async fn fetch_secondary_video_url(&self, lookup_key: &str) -> Result<String, UpstreamError>;
}
