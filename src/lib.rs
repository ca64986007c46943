//! # YouTube Data Extractor Library
//!
//! A quota-aware extraction pipeline for building video and channel datasets
//! from the YouTube Data API v3. Designed for long-running, resumable
//! collection campaigns driven by a fixed list of search phrases.
//!
//! ## Features
//!
//! - **Quota Budgeting**: Every API call is priced against the platform's
//!   daily unit budget; the pipeline degrades to partial results instead of
//!   attempting calls it cannot afford
//! - **Rate Limiting**: Built-in minimum spacing between outbound requests
//! - **Resume Capability**: Campaign progress is checkpointed after every
//!   query so a multi-hour run survives interruption
//! - **Channel Aggregation**: Unique channels referenced by collected videos
//!   are fetched in fixed-size batches
//! - **CSV Export & Analytics**: Tabular exports plus aggregate statistics
//!   served over a small HTTP API
//!
//! ## Quick Start
//!
//! ```no_run
//! use youtube_data_extractor::campaign::status::StatusHandle;
//! use youtube_data_extractor::campaign::{CampaignConfig, CampaignRunner, StopSignal};
//! use youtube_data_extractor::client::http::YouTubeClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(YouTubeClient::new("api-key".to_string(), 10_000));
//!
//! let config = CampaignConfig::new(
//!     vec!["Mozart Requiem".to_string(), "Bach Magnificat".to_string()],
//!     "./extraction_progress.json".into(),
//!     "./data".into(),
//! );
//!
//! let runner = CampaignRunner::new(client, StatusHandle::new(), StopSignal::shared());
//! let report = runner.run(&config).await?;
//! println!("collected {} videos", report.videos_collected);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several core modules:
//!
//! - [`client`] - YouTube Data API gateway with quota ledger and rate governor
//! - [`extract`] - Pagination driver and channel aggregation pass
//! - [`campaign`] - Checkpointed campaign orchestration and status reporting
//! - [`output`] - CSV export and summary report writers
//! - [`analysis`] - Aggregate statistics over exported datasets
//! - [`server`] - HTTP control and analytics surface
//! - [`cli`] - Command-line entry points
//!
//! ## Data Types
//!
//! - [`VideoRecord`] - One normalized search result
//! - [`ChannelRecord`] - One channel profile, with statistics carried as the
//!   API returns them (strings; numeric coercion happens during analysis)

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Aggregate statistics over exported datasets
pub mod analysis;

/// Checkpointed campaign orchestration
pub mod campaign;

/// CLI command implementations
pub mod cli;

/// YouTube Data API client with quota management
pub mod client;

/// Configuration and environment loading
pub mod config;

/// Video and channel extraction passes
pub mod extract;

/// Data output writers
pub mod output;

/// HTTP control and analytics surface
pub mod server;

// Re-export commonly used types
pub use campaign::{CampaignConfig, CampaignRunner};
pub use client::quota::QuotaLedger;

/// One video search result, normalized to a flat record.
///
/// Field names serialize in camelCase to match both the platform's JSON and
/// the checkpoint/CSV formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Platform video identifier; unique within a query's result set
    #[serde(default)]
    pub video_id: String,
    /// Video title
    #[serde(default)]
    pub title: String,
    /// Video description
    #[serde(default)]
    pub description: String,
    /// Publication timestamp as an ISO-8601 string
    #[serde(default)]
    pub published_at: String,
    /// Display name of the uploading channel
    #[serde(default)]
    pub channel_title: String,
    /// Identifier of the uploading channel
    #[serde(default)]
    pub channel_id: String,
}

impl VideoRecord {
    /// Whether the record carries a resolvable video ID.
    ///
    /// Records failing this check are dropped during pagination.
    pub fn has_video_id(&self) -> bool {
        !self.video_id.trim().is_empty()
    }
}

/// One channel profile.
///
/// Numeric statistics are carried as strings exactly as the API returns
/// them; coercion to numbers happens only during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    /// Platform channel identifier; primary key across the collected set
    #[serde(default)]
    pub channel_id: String,
    /// Channel title
    #[serde(default)]
    pub title: String,
    /// Channel description
    #[serde(default)]
    pub description: String,
    /// Channel creation timestamp as an ISO-8601 string
    #[serde(default)]
    pub published_at: String,
    /// Country code, when the channel declares one
    #[serde(default)]
    pub country: String,
    /// Vanity URL handle, when set
    #[serde(default)]
    pub custom_url: String,
    /// Lifetime view count (string, per the API)
    #[serde(default)]
    pub view_count: String,
    /// Subscriber count (string, per the API)
    #[serde(default)]
    pub subscriber_count: String,
    /// Uploaded video count (string, per the API)
    #[serde(default)]
    pub video_count: String,
    /// Whether the channel hides its subscriber count
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    /// Canonical channel URL, derived from the channel ID
    #[serde(default)]
    pub channel_url: String,
}

impl ChannelRecord {
    /// Derive the canonical channel URL for an ID.
    ///
    /// Returns an empty string for an empty ID, matching the export format.
    pub fn url_for(channel_id: &str) -> String {
        if channel_id.is_empty() {
            String::new()
        } else {
            format!("https://www.youtube.com/channel/{channel_id}")
        }
    }
}
