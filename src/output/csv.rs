//! CSV export writers
//!
//! Column names and ordering match the original dataset layout: videos
//! carry a leading `searchQuery` column identifying the phrase each record
//! came from; channel statistics stay as the strings the API returned.

use super::{OutputError, OutputResult};
use crate::{ChannelRecord, VideoRecord};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// One row of the videos export: a [`VideoRecord`] tagged with the query
/// that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRow {
    /// Search phrase that produced this record
    pub search_query: String,
    /// Platform video identifier
    pub video_id: String,
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// Publication timestamp
    pub published_at: String,
    /// Uploading channel's display name
    pub channel_title: String,
    /// Uploading channel's identifier
    pub channel_id: String,
}

impl VideoRow {
    /// Tag a record with its originating query.
    pub fn from_record(query: &str, record: &VideoRecord) -> Self {
        Self {
            search_query: query.to_string(),
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            published_at: record.published_at.clone(),
            channel_title: record.channel_title.clone(),
            channel_id: record.channel_id.clone(),
        }
    }
}

fn open_writer(path: &Path) -> OutputResult<Writer<BufWriter<File>>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::Io(format!("failed to create directory: {e}")))?;
        }
    }
    let file =
        File::create(path).map_err(|e| OutputError::Io(format!("failed to create file: {e}")))?;
    Ok(Writer::from_writer(BufWriter::with_capacity(
        DEFAULT_BUFFER_SIZE,
        file,
    )))
}

/// Export all queries' videos to a single CSV, one row per record with the
/// `searchQuery` column first. Returns the number of rows written.
pub fn export_videos(
    video_data: &BTreeMap<String, Vec<VideoRecord>>,
    path: &Path,
) -> OutputResult<usize> {
    let mut writer = open_writer(path)?;
    let mut rows = 0usize;

    for (query, videos) in video_data {
        for record in videos {
            writer
                .serialize(VideoRow::from_record(query, record))
                .map_err(|e| OutputError::Csv(format!("failed to write video row: {e}")))?;
            rows += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| OutputError::Io(format!("failed to flush: {e}")))?;
    Ok(rows)
}

/// Export channel profiles to CSV in the canonical column order.
pub fn export_channels(channels: &[ChannelRecord], path: &Path) -> OutputResult<usize> {
    let mut writer = open_writer(path)?;

    for record in channels {
        writer
            .serialize(record)
            .map_err(|e| OutputError::Csv(format!("failed to write channel row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| OutputError::Io(format!("failed to flush: {e}")))?;
    Ok(channels.len())
}

/// Read back a videos export.
pub fn read_videos(path: &Path) -> OutputResult<Vec<VideoRow>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| OutputError::Io(format!("failed to open {}: {e}", path.display())))?;
    reader
        .deserialize()
        .collect::<Result<Vec<VideoRow>, _>>()
        .map_err(|e| OutputError::Csv(format!("failed to parse video rows: {e}")))
}

/// Read back a channels export.
pub fn read_channels(path: &Path) -> OutputResult<Vec<ChannelRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| OutputError::Io(format!("failed to open {}: {e}", path.display())))?;
    reader
        .deserialize()
        .collect::<Result<Vec<ChannelRecord>, _>>()
        .map_err(|e| OutputError::Csv(format!("failed to parse channel rows: {e}")))
}
