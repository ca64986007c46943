//! Campaign checkpoint persistence
//!
//! One JSON file holds the whole campaign snapshot: the completed-query
//! list, the per-query video data, and the last-updated timestamp. The file
//! is rewritten in full after every query with atomic replace-on-write
//! (temp file + rename), so a concurrent reader never observes a
//! half-written file. Loads treat any unreadable file as a crash artifact
//! and fall back to a fresh checkpoint rather than failing the campaign.

use crate::VideoRecord;
use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum allowed checkpoint file size (50 MB) to prevent memory
/// exhaustion on load. Oversized files are treated as corrupt.
pub const MAX_CHECKPOINT_SIZE: u64 = 50 * 1024 * 1024;

/// Durable snapshot of a campaign's progress.
///
/// Invariant: a query present in `completed_queries` has a corresponding,
/// complete entry in `video_data`. Both are updated together by
/// [`record_query`](CampaignCheckpoint::record_query).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignCheckpoint {
    completed_queries: Vec<String>,
    video_data: BTreeMap<String, Vec<VideoRecord>>,
    last_updated: Option<DateTime<Utc>>,
}

impl CampaignCheckpoint {
    /// Queries completed so far, in completion order.
    pub fn completed_queries(&self) -> &[String] {
        &self.completed_queries
    }

    /// Collected records, keyed by query.
    pub fn video_data(&self) -> &BTreeMap<String, Vec<VideoRecord>> {
        &self.video_data
    }

    /// When the checkpoint was last persisted.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Total records across all completed queries.
    pub fn total_videos(&self) -> usize {
        self.video_data.values().map(Vec::len).sum()
    }

    /// Record a completed query and its collected videos.
    ///
    /// Idempotent for the query list: recording the same query twice
    /// replaces its data without duplicating the completion entry.
    pub fn record_query(&mut self, query: &str, videos: Vec<VideoRecord>) {
        self.video_data.insert(query.to_string(), videos);
        if !self.completed_queries.iter().any(|q| q == query) {
            self.completed_queries.push(query.to_string());
        }
    }

    /// The subset of `all_queries` not yet completed, original order
    /// preserved.
    pub fn remaining_queries(&self, all_queries: &[String]) -> Vec<String> {
        all_queries
            .iter()
            .filter(|q| !self.completed_queries.contains(q))
            .cloned()
            .collect()
    }

    /// Whether every requested query is present in the checkpoint.
    pub fn is_complete(&self, all_queries: &[String]) -> bool {
        all_queries
            .iter()
            .all(|q| self.completed_queries.contains(q))
    }

    /// Load a checkpoint, falling back to a fresh one when the file is
    /// missing, oversized, or unparseable. Never fatal.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no checkpoint found, starting fresh");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(checkpoint) => {
                info!(
                    path = %path.display(),
                    completed = checkpoint.completed_queries.len(),
                    videos = checkpoint.total_videos(),
                    "checkpoint loaded"
                );
                checkpoint
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load checkpoint, starting fresh");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, CheckpointError> {
        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CheckpointError::Lock(e.to_string()))?;
        let lock = RwLock::new(lock_file);
        let _guard = lock
            .read()
            .map_err(|e| CheckpointError::Lock(e.to_string()))?;

        let metadata = std::fs::metadata(path).map_err(|e| CheckpointError::Io(e.to_string()))?;
        if metadata.len() > MAX_CHECKPOINT_SIZE {
            return Err(CheckpointError::TooLarge {
                size: metadata.len(),
                max: MAX_CHECKPOINT_SIZE,
            });
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| CheckpointError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| CheckpointError::Corrupt(e.to_string()))
    }

    /// Persist the checkpoint atomically.
    ///
    /// Writes to a temp file in the same directory, flushes and syncs it,
    /// then renames over the target so a crash leaves either the pre- or
    /// post-write state, never a truncated file.
    ///
    /// # Errors
    /// A write failure here is the one non-configuration error allowed to
    /// abort a campaign: without a durable checkpoint the resumability
    /// contract is void.
    pub fn save(&mut self, path: &Path) -> Result<(), CheckpointError> {
        self.last_updated = Some(Utc::now());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Io(e.to_string()))?;
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?;

        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CheckpointError::Lock(e.to_string()))?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| CheckpointError::Lock(e.to_string()))?;

        let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir.unwrap_or(Path::new(".")))
            .map_err(|e| CheckpointError::Io(format!("failed to create temp file: {e}")))?;

        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| CheckpointError::Io(format!("failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| CheckpointError::Io(format!("failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| CheckpointError::Io(format!("failed to sync temp file: {e}")))?;

        temp_file
            .persist(path)
            .map_err(|e| CheckpointError::Io(format!("failed to persist temp file: {e}")))?;

        // Fsync the parent directory so the rename itself is durable.
        if let Some(parent) = parent_dir {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        info!(
            path = %path.display(),
            completed = self.completed_queries.len(),
            videos = self.total_videos(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Remove a retired checkpoint file after full campaign completion.
    pub fn retire(path: &Path) {
        if path.exists() {
            match std::fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "checkpoint removed, extraction complete"),
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove checkpoint"),
            }
        }
        let lock_path = path.with_extension("lock");
        if lock_path.exists() {
            let _ = std::fs::remove_file(lock_path);
        }
    }
}

/// Errors related to checkpoint persistence.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The file did not parse as a checkpoint
    #[error("corrupt checkpoint: {0}")]
    Corrupt(String),

    /// The file exceeds the size cap
    #[error("checkpoint file too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        /// Actual file size
        size: u64,
        /// Maximum allowed size
        max: u64,
    },

    /// File lock error
    #[error("lock error: {0}")]
    Lock(String),
}
