//! Core data types shared by the directory cache, the resolver and the routes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::config::{REJECTION_CODE, UNDEFINED_SENTINEL};

/// One camera in the directory.
///
/// Only records with a non-empty `id` and `name` and non-zero finite
/// coordinates are ever constructed by the parser or stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    /// Provider camera id (`CCTVID`)
    pub id: String,
    /// Display name (`CCTVNAME`)
    pub name: String,
    /// Operating center (`CENTERNAME`), empty when the export has none
    pub center: String,
    /// Latitude (`YCOORD`)
    pub lat: f64,
    /// Longitude (`XCOORD`)
    pub lng: f64,
}

impl CameraRecord {
    /// Whether the record satisfies the directory invariants.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && !self.name.is_empty()
            && self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat != 0.0
            && self.lng != 0.0
    }
}

/// Point-in-time view of the directory.
///
/// `records` is shared with the store, so taking a snapshot never copies the
/// directory. `refreshing` reflects the refresh gate at the moment of the read.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    /// Cameras in directory order
    pub records: Arc<Vec<CameraRecord>>,
    /// Time of the last successful fetch; the Unix epoch if there was none
    pub fetched_at: DateTime<Utc>,
    /// A refresh was in flight when the snapshot was taken
    pub refreshing: bool,
}

impl DirectorySnapshot {
    /// Number of records in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A camera matched by a proximity query, with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyCamera {
    /// The matched camera
    #[serde(flatten)]
    pub record: CameraRecord,
    /// Great-circle distance in kilometers
    pub distance: f64,
}

/// Keys the resolver understands in a provider metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ProviderField {
    /// `CCTVID`
    CctvId,
    /// `CCTVNAME`
    CctvName,
    /// `CENTERNAME`
    CenterName,
    /// `KIND`, the vendor family as the provider reports it
    Kind,
    /// `CCTVIP`
    CctvIp,
    /// `CH`
    Channel,
    /// `ID`, an auxiliary id some vendors use instead of `CCTVID`
    AuxId,
    /// `PASSWD`
    Password,
    /// `PORT`
    Port,
    /// `XCOORD` (longitude)
    XCoord,
    /// `YCOORD` (latitude)
    YCoord,
}

impl ProviderField {
    /// Key as it appears in the provider's JSON
    pub fn key(self) -> &'static str {
        match self {
            ProviderField::CctvId => "CCTVID",
            ProviderField::CctvName => "CCTVNAME",
            ProviderField::CenterName => "CENTERNAME",
            ProviderField::Kind => "KIND",
            ProviderField::CctvIp => "CCTVIP",
            ProviderField::Channel => "CH",
            ProviderField::AuxId => "ID",
            ProviderField::Password => "PASSWD",
            ProviderField::Port => "PORT",
            ProviderField::XCoord => "XCOORD",
            ProviderField::YCoord => "YCOORD",
        }
    }
}

/// Per-camera metadata as returned by the provider.
///
/// The provider is inconsistent about absent values: a field may be missing,
/// `null`, an empty string, or the literal text `undefined`. [`get`](Self::get)
/// folds all of these into `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProviderRecord(Map<String, Value>);

impl RawProviderRecord {
    /// Normalized value of a recognized field.
    pub fn get(&self, field: ProviderField) -> Option<String> {
        self.get_key(field.key())
    }

    fn get_key(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        if text.is_empty() || text == UNDEFINED_SENTINEL || text == "null" {
            None
        } else {
            Some(text)
        }
    }

    /// Whether this is the provider's access-denial shape (`code == 9999`).
    pub fn is_rejection(&self) -> bool {
        self.get_key("code").as_deref() == Some(REJECTION_CODE)
    }

    /// Provider's error message, present on error-shaped responses
    pub fn message(&self) -> Option<String> {
        self.get_key("msg")
    }

    /// Whether any recognized camera field carries a value.
    pub fn has_camera_fields(&self) -> bool {
        ProviderField::iter().any(|field| self.get(field).is_some())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawProviderRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawProviderRecord(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// How the client should play the resolved stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    /// Embed the provider's viewer page
    Webview,
    /// Play `direct_video_url` with a native media player
    Direct,
}

/// Result of resolving one camera id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLocator {
    /// Viewer page (or river-authority page) that plays the stream
    pub stream_page_url: String,
    /// Corrected camera kind, or `undefined` when the provider reported none
    pub kind: String,
    /// Directly playable media URL, when one could be derived
    pub direct_video_url: Option<String>,
    /// `Direct` exactly when `direct_video_url` is set
    pub player_type: PlayerType,
}
