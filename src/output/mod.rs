//! Data output writers
//!
//! CSV exports for videos and channels plus a plain-text extraction summary,
//! written under a timestamped naming scheme so the analyzer can always find
//! the most recent dataset.

use crate::client::QuotaUsage;
use crate::{ChannelRecord, VideoRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod csv;
pub mod report;

/// Output writer errors.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Filename prefix for video exports.
pub const VIDEOS_PREFIX: &str = "videos_";

/// Filename prefix for channel exports.
pub const CHANNELS_PREFIX: &str = "channels_";

/// Filename prefix for summary reports.
pub const SUMMARY_PREFIX: &str = "extraction_summary_";

/// Build a timestamped filename like `videos_20240101_120000.csv`.
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    format!("{prefix}{stamp}.{extension}")
}

/// Export the full dataset: one videos CSV, one channels CSV (when any
/// channels were collected), and a summary report.
///
/// Returns the paths written. The channels file is omitted rather than
/// written empty when the channel pass produced nothing.
pub fn export_dataset(
    data_dir: &Path,
    video_data: &BTreeMap<String, Vec<VideoRecord>>,
    channels: &[ChannelRecord],
    quota: &QuotaUsage,
) -> OutputResult<Vec<PathBuf>> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| OutputError::Io(format!("failed to create {}: {e}", data_dir.display())))?;

    let mut written = Vec::new();

    let videos_path = data_dir.join(timestamped_filename(VIDEOS_PREFIX, "csv"));
    let exported = csv::export_videos(video_data, &videos_path)?;
    info!(path = %videos_path.display(), videos = exported, "exported videos");
    written.push(videos_path);

    if !channels.is_empty() {
        let channels_path = data_dir.join(timestamped_filename(CHANNELS_PREFIX, "csv"));
        csv::export_channels(channels, &channels_path)?;
        info!(path = %channels_path.display(), channels = channels.len(), "exported channels");
        written.push(channels_path);
    }

    let summary_path = data_dir.join(timestamped_filename(SUMMARY_PREFIX, "txt"));
    report::write_summary(video_data, channels, quota, &summary_path)?;
    info!(path = %summary_path.display(), "exported summary report");
    written.push(summary_path);

    Ok(written)
}
