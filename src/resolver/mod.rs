//! Stream locator resolution.
//!
//! Turns one camera id into something a client can play. The provider's
//! metadata is inconsistent across the regional sub-providers, so resolution
//! runs a fixed pipeline:
//!
//! 1. Fetch the metadata record (rejections and empty records fail here)
//! 2. Correct the kind from the id prefix (`kind`)
//! 3. River-authority cameras get their office's page and stop (`authority`)
//! 4. Everyone else gets the generic viewer URL (`viewer`)
//! 5. Best effort: derive a direct media URL for the kind (`direct`)

mod authority;
mod direct;
mod kind;
mod viewer;

use std::sync::Arc;

use crate::config::{Config, UNDEFINED_SENTINEL};
use crate::error_handling::ResolveError;
use crate::models::{PlayerType, ProviderField, RawProviderRecord, StreamLocator};
use crate::provider::Provider;

use authority::RiverAuthority;
use direct::{normalize_secondary_url, secondary_lookup_key, DirectStrategy};

pub use direct::{DirectMediaTable, LEGACY_SECONDARY_KINDS};

/// A resolved camera: the locator plus the metadata it was derived from.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    /// Id as requested by the caller
    pub camera_id: String,
    /// Where and how to play the stream
    pub locator: StreamLocator,
    /// Provider record as fetched
    pub metadata: RawProviderRecord,
}

/// Resolves camera ids into [`StreamLocator`]s.
pub struct StreamResolver {
    provider: Arc<dyn Provider>,
    api_key: String,
    viewer_host: String,
    direct: DirectMediaTable,
}

impl StreamResolver {
    /// Resolver fetching metadata through `provider`.
    ///
    /// `api_key` is sent on metadata lookups and embedded in viewer URLs.
    pub fn new(
        provider: Arc<dyn Provider>,
        api_key: impl Into<String>,
        viewer_host: impl Into<String>,
        direct: DirectMediaTable,
    ) -> Self {
        StreamResolver {
            provider,
            api_key: api_key.into(),
            viewer_host: viewer_host.into(),
            direct,
        }
    }

    /// Builds a resolver from the service configuration.
    pub fn from_config(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.api_key.clone(),
            config.viewer_host.clone(),
            DirectMediaTable::new(config.secondary_kinds.iter().cloned()),
        )
    }

    /// Fetches the metadata for `camera_id` and resolves it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty id
    /// - `UpstreamUnreachable` if the metadata fetch fails
    /// - `UpstreamRejected` if the provider refuses the id
    /// - `NotFound` if the provider returns no camera fields
    pub async fn resolve(&self, camera_id: &str) -> Result<ResolvedStream, ResolveError> {
        let camera_id = camera_id.trim();
        if camera_id.is_empty() {
            return Err(ResolveError::InvalidInput(camera_id.to_string()));
        }

        let metadata = self
            .provider
            .fetch_camera_metadata(camera_id, &self.api_key)
            .await
            .map_err(|source| {
                log::error!("Metadata fetch failed for {}: {}", camera_id, source);
                ResolveError::UpstreamUnreachable {
                    camera_id: camera_id.to_string(),
                    source,
                }
            })?;

        let locator = self.locate(camera_id, &metadata).await?;
        log::info!(
            "Resolved {} (kind {}, player {:?})",
            camera_id,
            locator.kind,
            locator.player_type
        );
        Ok(ResolvedStream {
            camera_id: camera_id.to_string(),
            locator,
            metadata,
        })
    }

    /// Runs the resolution pipeline over an already fetched record.
    pub async fn locate(
        &self,
        requested_id: &str,
        raw: &RawProviderRecord,
    ) -> Result<StreamLocator, ResolveError> {
        if raw.is_rejection() {
            let message = raw.message().unwrap_or_default();
            log::warn!("Provider rejected {}: {}", requested_id, message);
            return Err(ResolveError::UpstreamRejected {
                camera_id: requested_id.to_string(),
                message,
            });
        }
        if !raw.has_camera_fields() {
            return Err(ResolveError::NotFound {
                camera_id: requested_id.to_string(),
            });
        }

        let camera_id = raw
            .get(ProviderField::CctvId)
            .unwrap_or_else(|| requested_id.to_string());
        let reported = raw.get(ProviderField::Kind);
        let kind = kind::correct_kind(&camera_id, reported.as_deref());
        let kind_label = kind
            .clone()
            .unwrap_or_else(|| UNDEFINED_SENTINEL.to_string());

        if let Some(authority) = RiverAuthority::for_record(raw) {
            log::debug!("{} is served by the {} office page", camera_id, authority.keyword);
            return Ok(StreamLocator {
                stream_page_url: authority.page_url(raw),
                kind: kind_label,
                direct_video_url: None,
                player_type: PlayerType::Webview,
            });
        }

        let stream_page_url = viewer::viewer_url(
            &self.viewer_host,
            &self.api_key,
            &camera_id,
            kind.as_deref(),
            raw,
        );

        let direct_video_url = match kind.as_deref() {
            Some(kind) => self.direct_url(kind, &camera_id, raw).await,
            None => None,
        };
        let player_type = if direct_video_url.is_some() {
            PlayerType::Direct
        } else {
            PlayerType::Webview
        };

        Ok(StreamLocator {
            stream_page_url,
            kind: kind_label,
            direct_video_url,
            player_type,
        })
    }

    /// Direct media URL for the kind, if one can be had. Never fails.
    async fn direct_url(&self, kind: &str, camera_id: &str, raw: &RawProviderRecord) -> Option<String> {
        match self.direct.strategy(kind)? {
            DirectStrategy::Template(build) => build(camera_id, raw),
            DirectStrategy::SecondaryLookup => {
                let key = secondary_lookup_key(raw)?;
                match self.provider.fetch_secondary_video_url(&key).await {
                    Ok(body) => {
                        let url = normalize_secondary_url(&body);
                        if url.is_none() {
                            log::warn!(
                                "Secondary lookup for {} returned no usable URL, using viewer",
                                camera_id
                            );
                        }
                        url
                    }
                    Err(e) => {
                        log::warn!(
                            "Secondary lookup for {} failed, using viewer: {}",
                            camera_id,
                            e
                        );
                        None
                    }
                }
            }
        }
    }
}
