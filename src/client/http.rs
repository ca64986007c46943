//! YouTube Data API v3 HTTP gateway
//!
//! One reqwest client for all API interactions. Each call follows the same
//! sequence: local budget pre-check (fail closed), rate governor wait,
//! remote call, charge the ledger on confirmed success, then normalize the
//! response.
//!
//! The platform signals daily-budget exhaustion as a 403 whose body carries
//! the `quotaExceeded` reason. That marker is what distinguishes "come back
//! after rollover" from other authorization failures, and the remote signal
//! is authoritative even when the local ledger believed budget remained.

use super::{
    ApiError, ApiResult, Operation, QuotaLedger, QuotaUsage, RateGovernor, SearchOrder,
    SearchPage, VideoApi, VideoDetails,
};
use crate::{ChannelRecord, VideoRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Maximum IDs per batch detail request, imposed by the API.
pub const MAX_BATCH_IDS: usize = 50;

/// Maximum results per search page, imposed by the API.
pub const MAX_PAGE_SIZE: u32 = 50;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Marker the platform embeds in 403 bodies when the daily budget is spent.
const QUOTA_MARKER: &str = "quotaExceeded";

/// Maximum error-body length carried into an [`ApiError::Api`].
const ERROR_BODY_LIMIT: usize = 512;

/// Gateway to the YouTube Data API v3.
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    ledger: Mutex<QuotaLedger>,
    governor: tokio::sync::Mutex<RateGovernor>,
}

impl YouTubeClient {
    /// Create a client with the default endpoint and rate governor.
    pub fn new(api_key: String, daily_quota: u32) -> Self {
        Self::with_base_url(api_key, daily_quota, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (used by tests).
    pub fn with_base_url(api_key: String, daily_quota: u32, base_url: impl Into<String>) -> Self {
        info!(daily_quota, "YouTube API client initialized");
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            ledger: Mutex::new(QuotaLedger::new(daily_quota)),
            governor: tokio::sync::Mutex::new(RateGovernor::default()),
        }
    }

    /// Fail closed when the local budget does not cover `op`.
    fn ensure_budget(&self, op: Operation) -> ApiResult<()> {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        if ledger.can_afford(op) {
            Ok(())
        } else {
            Err(ApiError::InsufficientQuota {
                remaining: ledger.remaining(),
                needed: op.cost(),
            })
        }
    }

    fn charge(&self, op: Operation) {
        self.ledger.lock().expect("ledger lock poisoned").charge(op);
    }

    /// Execute one GET against `endpoint`, mapping failures to domain
    /// signals and charging the ledger on success.
    async fn get<T>(&self, op: Operation, endpoint: &str, params: &[(&str, String)]) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.ensure_budget(op)?;
        self.governor.lock().await.throttle().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(operation = op.as_str(), %url, "issuing API request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 403 && body.contains(QUOTA_MARKER) {
                error!("YouTube API quota exceeded");
                return Err(ApiError::QuotaExceeded(
                    "daily quota limit exceeded; resets at midnight Pacific Time".to_string(),
                ));
            }
            warn!(status = status.as_u16(), "API request failed");
            let message: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // The remote side completed and billed the request; charge before
        // deserialization so a local parse failure cannot desync the ledger.
        self.charge(op);

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl VideoApi for YouTubeClient {
    async fn search_page(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
        order: SearchOrder,
    ) -> ApiResult<SearchPage> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
            ("order", order.as_str().to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response: SearchResponse = self.get(Operation::Search, "search", &params).await?;
        let page = SearchPage {
            items: response
                .items
                .into_iter()
                .map(SearchItem::into_record)
                .collect(),
            next_page_token: response.next_page_token,
        };

        info!(
            query,
            results = page.items.len(),
            "search request completed"
        );
        Ok(page)
    }

    async fn fetch_video_details(&self, ids: &[String]) -> ApiResult<Vec<VideoDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = &ids[..ids.len().min(MAX_BATCH_IDS)];

        let params = [
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("id", ids.join(",")),
        ];
        let response: VideosResponse = self.get(Operation::VideoDetails, "videos", &params).await?;

        debug!(count = response.items.len(), "video details fetched");
        Ok(response
            .items
            .into_iter()
            .map(VideoItem::into_details)
            .collect())
    }

    async fn fetch_channel_details(&self, ids: &[String]) -> ApiResult<Vec<ChannelRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = &ids[..ids.len().min(MAX_BATCH_IDS)];

        let params = [
            (
                "part",
                "snippet,statistics,contentDetails,brandingSettings".to_string(),
            ),
            ("id", ids.join(",")),
        ];
        let response: ChannelsResponse = self
            .get(Operation::ChannelDetails, "channels", &params)
            .await?;

        debug!(count = response.items.len(), "channel details fetched");
        Ok(response
            .items
            .into_iter()
            .map(ChannelItem::into_record)
            .collect())
    }

    fn can_afford(&self, op: Operation) -> bool {
        self.ledger
            .lock()
            .expect("ledger lock poisoned")
            .can_afford(op)
    }

    fn quota_usage(&self) -> QuotaUsage {
        self.ledger.lock().expect("ledger lock poisoned").usage()
    }
}

// ---------------------------------------------------------------------------
// Wire types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
    #[serde(default)]
    snippet: Snippet,
}

/// The `id` field is an object for search results and a bare string in some
/// other listings; both shapes resolve to the video ID.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchItemId {
    Object {
        #[serde(rename = "videoId", default)]
        video_id: String,
    },
    Plain(String),
}

impl Default for SearchItemId {
    fn default() -> Self {
        SearchItemId::Plain(String::new())
    }
}

impl SearchItemId {
    fn resolve(self) -> String {
        match self {
            SearchItemId::Object { video_id } => video_id,
            SearchItemId::Plain(id) => id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    channel_id: String,
}

impl SearchItem {
    fn into_record(self) -> VideoRecord {
        VideoRecord {
            video_id: self.id.resolve(),
            title: self.snippet.title,
            description: self.snippet.description,
            published_at: self.snippet.published_at,
            channel_title: self.snippet.channel_title,
            channel_id: self.snippet.channel_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default)]
    view_count: String,
    #[serde(default)]
    like_count: String,
    #[serde(default)]
    comment_count: String,
}

impl VideoItem {
    fn into_details(self) -> VideoDetails {
        VideoDetails {
            video_id: self.id,
            title: self.snippet.title,
            duration: self.content_details.duration,
            view_count: self.statistics.view_count,
            like_count: self.statistics.like_count,
            comment_count: self.statistics.comment_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    custom_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde(default = "zero_count")]
    view_count: String,
    #[serde(default = "zero_count")]
    subscriber_count: String,
    #[serde(default = "zero_count")]
    video_count: String,
    #[serde(default)]
    hidden_subscriber_count: bool,
}

fn zero_count() -> String {
    "0".to_string()
}

impl ChannelItem {
    fn into_record(self) -> ChannelRecord {
        let channel_url = ChannelRecord::url_for(&self.id);
        ChannelRecord {
            channel_id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            published_at: self.snippet.published_at,
            country: self.snippet.country,
            custom_url: self.snippet.custom_url,
            view_count: self.statistics.view_count,
            subscriber_count: self.statistics.subscriber_count,
            video_count: self.statistics.video_count,
            hidden_subscriber_count: self.statistics.hidden_subscriber_count,
            channel_url,
        }
    }
}
