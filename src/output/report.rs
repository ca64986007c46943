//! Plain-text extraction summary report

use super::{OutputError, OutputResult};
use crate::client::QuotaUsage;
use crate::{ChannelRecord, VideoRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// Write the extraction summary: per-query video counts, the unique channel
/// count, and quota usage.
pub fn write_summary(
    video_data: &BTreeMap<String, Vec<VideoRecord>>,
    channels: &[ChannelRecord],
    quota: &QuotaUsage,
    path: &Path,
) -> OutputResult<()> {
    let mut out = Vec::new();
    render_summary(video_data, channels, quota, &mut out)
        .map_err(|e| OutputError::Io(e.to_string()))?;

    std::fs::write(path, out)
        .map_err(|e| OutputError::Io(format!("failed to write {}: {e}", path.display())))
}

fn render_summary(
    video_data: &BTreeMap<String, Vec<VideoRecord>>,
    channels: &[ChannelRecord],
    quota: &QuotaUsage,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "YouTube Data Extraction Summary")?;
    writeln!(out, "{RULE}")?;
    writeln!(out)?;
    writeln!(
        out,
        "Extraction Date: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(out)?;

    writeln!(out, "Video Collection Summary:")?;
    writeln!(out, "{THIN_RULE}")?;
    let mut total_videos = 0usize;
    for (query, videos) in video_data {
        writeln!(out, "  {query}: {} videos", videos.len())?;
        total_videos += videos.len();
    }
    writeln!(out)?;
    writeln!(out, "  TOTAL VIDEOS: {total_videos}")?;
    writeln!(out)?;

    writeln!(out, "Channel Collection Summary:")?;
    writeln!(out, "{THIN_RULE}")?;
    writeln!(out, "  Unique Channels: {}", channels.len())?;
    writeln!(out)?;

    writeln!(out, "API Quota Usage:")?;
    writeln!(out, "{THIN_RULE}")?;
    writeln!(out, "  Used: {}", quota.used)?;
    writeln!(out, "  Limit: {}", quota.limit)?;
    writeln!(out, "  Remaining: {}", quota.remaining)?;
    writeln!(out, "  Total Requests: {}", quota.requests)?;
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    Ok(())
}
