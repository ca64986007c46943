//! YouTube Data API client
//!
//! The gateway issues one logical operation per call (a search page, a batch
//! detail fetch) and converts transport and authorization failures into
//! domain-level signals. Quota bookkeeping is strictly tied to confirmed
//! remote success: a failed call never charges the ledger.
//!
//! Quota exhaustion is an expected campaign outcome, not an exceptional one,
//! so callers branch on [`ApiError::is_quota`] rather than treating every
//! error as fatal.

use crate::{ChannelRecord, VideoRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod http;
pub mod quota;
pub mod throttle;

pub use quota::{Operation, QuotaLedger, QuotaUsage};
pub use throttle::RateGovernor;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The remote service refused the call because the daily budget is
    /// exhausted. Recoverable by waiting for the platform's rollover.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The local ledger refused the call before the remote side was
    /// contacted. Control flow treats this like [`ApiError::QuotaExceeded`].
    #[error("insufficient quota: {remaining} units remaining, {needed} needed")]
    InsufficientQuota {
        /// Units left in the local budget
        remaining: u32,
        /// Units the rejected operation would have cost
        needed: u32,
    },

    /// Network or protocol failure unrelated to quota.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-quota error response from the API.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        message: String,
    },

    /// The response body could not be deserialized.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether this failure means the budget is spent, locally or remotely.
    pub fn is_quota(&self) -> bool {
        matches!(
            self,
            ApiError::QuotaExceeded(_) | ApiError::InsufficientQuota { .. }
        )
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Normalized records; items without a resolvable video ID keep an
    /// empty `video_id` and are filtered by the pagination driver
    pub items: Vec<VideoRecord>,
    /// Continuation token; absent on the last page
    pub next_page_token: Option<String>,
}

/// Per-video statistics from a `videos.list` call.
///
/// Counts stay as strings, consistent with the rest of the data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    /// Platform video identifier
    #[serde(default)]
    pub video_id: String,
    /// Video title
    #[serde(default)]
    pub title: String,
    /// ISO-8601 duration
    #[serde(default)]
    pub duration: String,
    /// View count
    #[serde(default)]
    pub view_count: String,
    /// Like count
    #[serde(default)]
    pub like_count: String,
    /// Comment count
    #[serde(default)]
    pub comment_count: String,
}

/// Sort order for search requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    /// Most recent first
    #[default]
    Date,
    /// Highest rated first
    Rating,
    /// Best match first
    Relevance,
    /// Alphabetical by title
    Title,
    /// Most viewed first
    ViewCount,
}

impl SearchOrder {
    /// Wire value for the `order` request parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
            SearchOrder::Rating => "rating",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Title => "title",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

impl std::fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SearchOrder::Date),
            "rating" => Ok(SearchOrder::Rating),
            "relevance" => Ok(SearchOrder::Relevance),
            "title" => Ok(SearchOrder::Title),
            "viewCount" => Ok(SearchOrder::ViewCount),
            _ => Err(format!("invalid search order: {s}")),
        }
    }
}

/// The gateway seam between the extraction pipeline and the remote API.
///
/// Every implementation must uphold the charge-on-success contract: ledger
/// state changes only after the corresponding remote call completed, and a
/// call refused by the local budget check fails closed without contacting
/// the remote side.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Issue one search request.
    ///
    /// # Arguments
    /// * `query` - Search phrase
    /// * `max_results` - Page size; clamped to 50 by the API
    /// * `page_token` - Continuation token from the previous page
    /// * `order` - Sort order
    async fn search_page(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
        order: SearchOrder,
    ) -> ApiResult<SearchPage>;

    /// Fetch details for up to 50 video IDs in one call.
    ///
    /// An empty ID list returns an empty result without spending quota.
    async fn fetch_video_details(&self, ids: &[String]) -> ApiResult<Vec<VideoDetails>>;

    /// Fetch details for up to 50 channel IDs in one call.
    ///
    /// An empty ID list returns an empty result without spending quota.
    async fn fetch_channel_details(&self, ids: &[String]) -> ApiResult<Vec<ChannelRecord>>;

    /// Whether the local budget covers one more request of this kind.
    fn can_afford(&self, op: Operation) -> bool;

    /// Current local quota usage snapshot.
    fn quota_usage(&self) -> QuotaUsage;
}
