//! Aggregate statistics over exported datasets
//!
//! Loads the most recent video/channel CSV pair from the data directory and
//! answers the analytics queries the HTTP surface exposes. This is the one
//! place string-typed counts from the API are coerced to numbers;
//! unparseable values coerce to zero rather than failing the analysis.

use crate::output::csv::{read_channels, read_videos, VideoRow};
use crate::output::{CHANNELS_PREFIX, VIDEOS_PREFIX};
use crate::ChannelRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Analysis errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No exported dataset exists yet
    #[error("no data available for analysis in {0}")]
    NoData(String),

    /// An export file could not be read
    #[error("failed to load dataset: {0}")]
    Load(String),
}

/// High-level overview of the collected dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Total video rows
    pub total_videos: usize,
    /// Total channel profiles (distinct channels from videos when no
    /// channel export exists)
    pub total_channels: usize,
    /// Distinct search queries represented
    pub search_queries: usize,
    /// Earliest `publishedAt` across all videos
    pub earliest_published: Option<String>,
    /// Latest `publishedAt` across all videos
    pub latest_published: Option<String>,
    /// Sum of channel view counts
    pub total_views: u64,
    /// Sum of channel subscriber counts
    pub total_subscribers: u64,
    /// Mean subscriber count per channel
    pub avg_subscribers_per_channel: f64,
}

/// Per-query statistics.
#[derive(Debug, Clone, Serialize)]
pub struct QueryStats {
    /// The search phrase
    pub query: String,
    /// Videos collected for it
    pub video_count: usize,
    /// Distinct channels among those videos
    pub unique_channels: usize,
    /// `video_count / unique_channels`
    pub avg_videos_per_channel: f64,
}

/// One entry of the top-channel ranking.
#[derive(Debug, Clone, Serialize)]
pub struct TopChannel {
    /// Channel identifier
    pub channel_id: String,
    /// Channel title
    pub title: String,
    /// Subscriber count, coerced
    pub subscriber_count: u64,
    /// View count, coerced
    pub view_count: u64,
    /// Video count, coerced
    pub video_count: u64,
    /// Declared country, if any
    pub country: String,
}

/// Analyzer over the most recent exported dataset.
#[derive(Debug, Default)]
pub struct DataAnalyzer {
    videos: Vec<VideoRow>,
    channels: Vec<ChannelRecord>,
}

impl DataAnalyzer {
    /// Load the latest `videos_*.csv` and `channels_*.csv` from `data_dir`.
    ///
    /// The timestamped naming scheme sorts lexicographically, so the
    /// maximum filename is the newest export. A missing channels file is
    /// fine; a missing videos file means there is nothing to analyze.
    ///
    /// # Errors
    /// Returns [`AnalysisError::NoData`] when no video export exists and
    /// [`AnalysisError::Load`] when a file exists but cannot be parsed.
    pub fn load_latest(data_dir: &Path) -> Result<Self, AnalysisError> {
        let videos_path = latest_file(data_dir, VIDEOS_PREFIX)
            .ok_or_else(|| AnalysisError::NoData(data_dir.display().to_string()))?;
        let videos =
            read_videos(&videos_path).map_err(|e| AnalysisError::Load(e.to_string()))?;
        info!(path = %videos_path.display(), rows = videos.len(), "loaded video data");

        let channels = match latest_file(data_dir, CHANNELS_PREFIX) {
            Some(path) => {
                let channels =
                    read_channels(&path).map_err(|e| AnalysisError::Load(e.to_string()))?;
                info!(path = %path.display(), rows = channels.len(), "loaded channel data");
                channels
            }
            None => {
                debug!("no channel export found");
                Vec::new()
            }
        };

        Ok(Self { videos, channels })
    }

    /// Build an analyzer directly from records (used by tests).
    pub fn from_records(videos: Vec<VideoRow>, channels: Vec<ChannelRecord>) -> Self {
        Self { videos, channels }
    }

    /// High-level overview statistics.
    pub fn overview(&self) -> Overview {
        let queries: BTreeSet<&str> = self
            .videos
            .iter()
            .map(|v| v.search_query.as_str())
            .collect();

        let published: Vec<&String> = self
            .videos
            .iter()
            .map(|v| &v.published_at)
            .filter(|p| !p.is_empty())
            .collect();

        let total_channels = if self.channels.is_empty() {
            self.videos
                .iter()
                .map(|v| v.channel_id.as_str())
                .filter(|id| !id.is_empty())
                .collect::<BTreeSet<_>>()
                .len()
        } else {
            self.channels.len()
        };

        let total_views: u64 = self.channels.iter().map(|c| coerce(&c.view_count)).sum();
        let total_subscribers: u64 = self
            .channels
            .iter()
            .map(|c| coerce(&c.subscriber_count))
            .sum();
        let avg_subscribers_per_channel = if self.channels.is_empty() {
            0.0
        } else {
            total_subscribers as f64 / self.channels.len() as f64
        };

        Overview {
            total_videos: self.videos.len(),
            total_channels,
            search_queries: queries.len(),
            earliest_published: published.iter().min().map(|p| (*p).clone()),
            latest_published: published.iter().max().map(|p| (*p).clone()),
            total_views,
            total_subscribers,
            avg_subscribers_per_channel,
        }
    }

    /// Per-query statistics, sorted by video count descending.
    pub fn query_statistics(&self) -> Vec<QueryStats> {
        let mut grouped: BTreeMap<&str, Vec<&VideoRow>> = BTreeMap::new();
        for video in &self.videos {
            grouped.entry(&video.search_query).or_default().push(video);
        }

        let mut stats: Vec<QueryStats> = grouped
            .into_iter()
            .map(|(query, videos)| {
                let unique_channels = videos
                    .iter()
                    .map(|v| v.channel_id.as_str())
                    .filter(|id| !id.is_empty())
                    .collect::<BTreeSet<_>>()
                    .len();
                let avg = if unique_channels == 0 {
                    0.0
                } else {
                    videos.len() as f64 / unique_channels as f64
                };
                QueryStats {
                    query: query.to_string(),
                    video_count: videos.len(),
                    unique_channels,
                    avg_videos_per_channel: avg,
                }
            })
            .collect();

        stats.sort_by(|a, b| b.video_count.cmp(&a.video_count));
        stats
    }

    /// Top channels by subscriber count.
    pub fn top_channels(&self, limit: usize) -> Vec<TopChannel> {
        let mut ranked: Vec<TopChannel> = self
            .channels
            .iter()
            .map(|c| TopChannel {
                channel_id: c.channel_id.clone(),
                title: c.title.clone(),
                subscriber_count: coerce(&c.subscriber_count),
                view_count: coerce(&c.view_count),
                video_count: coerce(&c.video_count),
                country: c.country.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| b.subscriber_count.cmp(&a.subscriber_count));
        ranked.truncate(limit);
        ranked
    }
}

/// Most recent export with the given prefix, by filename order.
fn latest_file(data_dir: &Path, prefix: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(data_dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".csv"))
        })
        .max()
}

/// Coerce an API count string to a number; unparseable values become zero.
fn coerce(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}
