//! Shared test helpers: an in-memory provider with call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::Provider;
use crate::error_handling::UpstreamError;
use crate::models::RawProviderRecord;

/// Provider double. Unset responses fail.
#[derive(Default)]
pub(crate) struct FakeProvider {
    directory: Mutex<Option<Vec<u8>>>,
    metadata: Mutex<HashMap<String, RawProviderRecord>>,
    secondary: Mutex<HashMap<String, String>>,
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
    pub directory_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub secondary_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(self, bytes: Vec<u8>) -> Self {
        self.set_directory(Some(bytes));
        self
    }

    pub fn set_directory(&self, bytes: Option<Vec<u8>>) {
        *self.directory.lock().unwrap() = bytes;
    }

    pub fn with_metadata(self, camera_id: &str, record: RawProviderRecord) -> Self {
        self.metadata
            .lock()
            .unwrap()
            .insert(camera_id.to_string(), record);
        self
    }

    pub fn with_secondary(self, lookup_key: &str, body: &str) -> Self {
        self.secondary
            .lock()
            .unwrap()
            .insert(lookup_key.to_string(), body.to_string());
        self
    }

    /// Makes directory downloads wait for `release`. Returns (release, entered):
    /// `entered` is notified once a download has started.
    pub fn gated(mut self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&release));
        let entered = Arc::clone(&self.entered);
        (self, release, entered)
    }

    pub fn directory_calls(&self) -> usize {
        self.directory_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn fetch_directory_snapshot(&self) -> Result<Vec<u8>, UpstreamError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        self.directory
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| UpstreamError::Malformed("directory unavailable".to_string()))
    }

    async fn fetch_camera_metadata(
        &self,
        camera_id: &str,
        _api_key: &str,
    ) -> Result<RawProviderRecord, UpstreamError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.metadata
            .lock()
            .unwrap()
            .get(camera_id)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                url: format!("fake://metadata/{}", camera_id),
            })
    }

    async fn fetch_secondary_video_url(&self, lookup_key: &str) -> Result<String, UpstreamError> {
        self.secondary_calls.fetch_add(1, Ordering::SeqCst);
        self.secondary
            .lock()
            .unwrap()
            .get(lookup_key)
            .cloned()
            .ok_or_else(|| UpstreamError::Malformed("no video URL".to_string()))
    }
}

/// Builds a CSV directory document from (id, name, center, lat, lng) rows.
pub(crate) fn csv_directory(rows: &[(&str, &str, &str, f64, f64)]) -> Vec<u8> {
    let mut doc = String::from("CCTVID,CCTVNAME,CENTERNAME,XCOORD,YCOORD\n");
    for (id, name, center, lat, lng) in rows {
        doc.push_str(&format!("{},{},{},{},{}\n", id, name, center, lng, lat));
    }
    doc.into_bytes()
}
