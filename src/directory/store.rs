//! In-memory directory store with write-through persistence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::persist::{load_snapshot, save_snapshot};
use crate::models::{CameraRecord, DirectorySnapshot};

/// Records and fetch time, always swapped together
#[derive(Debug)]
struct Committed {
    records: Arc<Vec<CameraRecord>>,
    fetched_at: DateTime<Utc>,
}

impl Committed {
    fn empty() -> Self {
        Committed {
            records: Arc::new(Vec::new()),
            fetched_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Owner of the camera directory.
///
/// Readers get a cheap [`DirectorySnapshot`] sharing the committed record list,
/// so a reader sees either the whole old directory or the whole new one. The
/// store also carries the refresh gate; see [`try_begin_refresh`](Self::try_begin_refresh).
#[derive(Debug)]
pub struct DirectoryStore {
    committed: RwLock<Committed>,
    refreshing: AtomicBool,
    snapshot_path: Option<PathBuf>,
}

impl DirectoryStore {
    /// Creates an empty store persisting to `snapshot_path`.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        DirectoryStore {
            committed: RwLock::new(Committed::empty()),
            refreshing: AtomicBool::new(false),
            snapshot_path: Some(snapshot_path.into()),
        }
    }

    /// Creates an empty store that never touches the disk.
    pub fn in_memory() -> Self {
        DirectoryStore {
            committed: RwLock::new(Committed::empty()),
            refreshing: AtomicBool::new(false),
            snapshot_path: None,
        }
    }

    /// Latest committed snapshot. Never blocks on a refresh.
    pub fn current(&self) -> DirectorySnapshot {
        let committed = self
            .committed
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        DirectorySnapshot {
            records: Arc::clone(&committed.records),
            fetched_at: committed.fetched_at,
            refreshing: self.is_refreshing(),
        }
    }

    /// Time of the last successful fetch (the Unix epoch if there was none)
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.committed
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .fetched_at
    }

    /// Whether the directory was fetched less than `ttl` before `now`.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.fetched_at()).to_std() {
            Ok(age) => age < ttl,
            // fetched_at is in the future
            Err(_) => true,
        }
    }

    /// Replaces the directory with freshly fetched records, then persists it.
    ///
    /// A persistence failure is logged and leaves the in-memory directory
    /// replaced.
    pub async fn replace(&self, records: Vec<CameraRecord>, now: DateTime<Utc>) {
        let records = Arc::new(records);
        self.swap(Arc::clone(&records), Some(now));

        if let Some(path) = &self.snapshot_path {
            match save_snapshot(path, &records, now).await {
                Ok(()) => log::debug!(
                    "Persisted {} cameras to {}",
                    records.len(),
                    path.display()
                ),
                Err(e) => log::warn!("Failed to persist directory snapshot: {:#}", e),
            }
        }
    }

    /// Installs fallback records without marking the directory as fetched.
    ///
    /// The fetch time is left untouched and nothing is persisted, so the
    /// directory stays stale and the next trigger retries the real fetch.
    pub fn install_fallback(&self, records: Vec<CameraRecord>) {
        self.swap(Arc::new(records), None);
    }

    fn swap(&self, records: Arc<Vec<CameraRecord>>, fetched_at: Option<DateTime<Utc>>) {
        let mut committed = self
            .committed
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        committed.records = records;
        if let Some(fetched_at) = fetched_at {
            committed.fetched_at = fetched_at;
        }
    }

    /// Loads the persisted snapshot, if there is a readable one.
    ///
    /// Returns the number of records loaded. A missing or corrupt file leaves
    /// the store empty.
    pub async fn hydrate(&self) -> usize {
        let Some(path) = &self.snapshot_path else {
            return 0;
        };
        if !path.exists() {
            log::info!("No snapshot file at {}, starting empty", path.display());
            return 0;
        }

        match load_snapshot(path).await {
            Ok(persisted) => {
                let count = persisted.records.len();
                self.swap(Arc::new(persisted.records), Some(persisted.fetched_at));
                log::info!(
                    "Loaded {} cameras from {} (fetched {})",
                    count,
                    path.display(),
                    persisted.fetched_at.to_rfc3339()
                );
                count
            }
            Err(e) => {
                log::error!("Failed to load snapshot, starting empty: {:#}", e);
                0
            }
        }
    }

    /// Whether a refresh currently holds the gate
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Takes the refresh gate, or returns `None` if a refresh is in flight.
    ///
    /// The gate is released when the returned guard is dropped, on every exit
    /// path of the refresh.
    pub fn try_begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RefreshGuard {
                flag: &self.refreshing,
            })
    }
}

/// Holds the refresh gate closed until dropped.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
