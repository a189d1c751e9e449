//! reqwest-backed provider client.

use std::time::Duration;

use async_trait::async_trait;

use super::Provider;
use crate::config::Config;
use crate::error_handling::{InitializationError, UpstreamError};
use crate::initialization::{init_client, init_insecure_client};
use crate::models::RawProviderRecord;

/// Provider endpoint URLs.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    /// Bulk directory export
    pub directory_url: String,
    /// Per-camera metadata lookup
    pub metadata_url: String,
    /// Secondary video URL lookup
    pub secondary_url: String,
}

impl From<&Config> for ProviderEndpoints {
    fn from(config: &Config) -> Self {
        ProviderEndpoints {
            directory_url: config.directory_url.clone(),
            metadata_url: config.metadata_url.clone(),
            secondary_url: config.secondary_url.clone(),
        }
    }
}

/// Client for the UTIC open-data endpoints.
///
/// The bulk export host presents a certificate that does not verify, so the
/// directory download goes through a separate client with verification
/// disabled. Metadata and secondary lookups use the verifying client.
#[derive(Debug, Clone)]
pub struct UticClient {
    client: reqwest::Client,
    export_client: reqwest::Client,
    endpoints: ProviderEndpoints,
    directory_timeout: Duration,
    metadata_timeout: Duration,
    secondary_timeout: Duration,
}

impl UticClient {
    /// Builds the provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if a reqwest client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        Ok(UticClient {
            client: init_client(config)?,
            export_client: init_insecure_client(config)?,
            endpoints: ProviderEndpoints::from(config),
            directory_timeout: Duration::from_secs(config.directory_timeout_secs),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
            secondary_timeout: Duration::from_secs(config.secondary_timeout_secs),
        })
    }
}

#[async_trait]
impl Provider for UticClient {
    async fn fetch_directory_snapshot(&self) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .export_client
            .get(&self.endpoints.directory_url)
            .timeout(self.directory_timeout)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded directory export: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn fetch_camera_metadata(
        &self,
        camera_id: &str,
        api_key: &str,
    ) -> Result<RawProviderRecord, UpstreamError> {
        log::debug!("Fetching metadata for camera {}", camera_id);
        let body = self
            .client
            .get(&self.endpoints.metadata_url)
            .query(&[("cctvId", camera_id), ("key", api_key)])
            .timeout(self.metadata_timeout)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::Malformed(format!(
                "metadata for {} is not a JSON object: {}",
                camera_id, e
            ))
        })
    }

    async fn fetch_secondary_video_url(&self, lookup_key: &str) -> Result<String, UpstreamError> {
        let text = self
            .client
            .get(&self.endpoints.secondary_url)
            .query(&[("cctvIp", lookup_key)])
            .timeout(self.secondary_timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }
}
