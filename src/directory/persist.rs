//! Directory snapshot persistence.
//!
//! The snapshot is stored as one JSON document holding every record and the
//! time it was fetched. Writes go to a temporary sibling file that is then
//! renamed over the target, so a crash never leaves a half-written snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::CameraRecord;

/// On-disk shape of the directory snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedDirectory {
    pub records: Vec<CameraRecord>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

/// Loads a previously persisted snapshot.
///
/// Records that no longer satisfy the directory invariants are dropped.
pub(crate) async fn load_snapshot(path: &Path) -> Result<PersistedDirectory> {
    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    let mut persisted: PersistedDirectory = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse snapshot file {}", path.display()))?;

    let before = persisted.records.len();
    persisted.records.retain(CameraRecord::is_valid);
    if persisted.records.len() != before {
        log::warn!(
            "Dropped {} invalid records from snapshot file {}",
            before - persisted.records.len(),
            path.display()
        );
    }

    Ok(persisted)
}

/// Writes the snapshot, replacing any previous file.
pub(crate) async fn save_snapshot(
    path: &Path,
    records: &[CameraRecord],
    fetched_at: DateTime<Utc>,
) -> Result<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct PersistedRef<'a> {
        records: &'a [CameraRecord],
        #[serde(with = "chrono::serde::ts_milliseconds")]
        fetched_at: DateTime<Utc>,
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&PersistedRef {
        records,
        fetched_at,
    })
    .context("Failed to serialize snapshot")?;

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, json)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample() -> Vec<CameraRecord> {
        vec![
            CameraRecord {
                id: "E620034".to_string(),
                name: "공주시 국재교".to_string(),
                center: "금강홍수통제소".to_string(),
                lat: 36.4606,
                lng: 127.1089,
            },
            CameraRecord {
                id: "L260003".to_string(),
                name: "김해 빙그레삼거리".to_string(),
                center: "김해교통정보센터".to_string(),
                lat: 35.2281,
                lng: 128.889,
            },
        ]
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_every_field() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cctv_cache.json");
        let fetched_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        save_snapshot(&path, &sample(), fetched_at)
            .await
            .expect("save should succeed");
        let loaded = load_snapshot(&path).await.expect("load should succeed");

        assert_eq!(loaded.records, sample());
        assert_eq!(loaded.fetched_at, fetched_at);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("cache.json");
        save_snapshot(&path, &sample(), Utc::now())
            .await
            .expect("save should succeed");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = TempDir::new().expect("temp dir");
        let result = load_snapshot(&dir.path().join("absent.json")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_fails() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").expect("write");
        let err = load_snapshot(&path).await.expect_err("corrupt file");
        assert!(err.to_string().contains("Failed to parse snapshot file"));
    }

    #[tokio::test]
    async fn test_load_drops_invalid_records() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"records":[
                {"id":"A","name":"ok","center":"","lat":37.0,"lng":127.0},
                {"id":"B","name":"zero","center":"","lat":0.0,"lng":127.0}
            ],"fetchedAt":0}"#,
        )
        .expect("write");
        let loaded = load_snapshot(&path).await.expect("load");
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].id, "A");
    }
}
