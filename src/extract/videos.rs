//! Paginated video search for a single query
//!
//! Drives repeated search-page calls until the target count is reached, the
//! result stream is exhausted, or the quota budget refuses further spend.
//! Quota exhaustion mid-query is an expected, recoverable outcome: the
//! collector always returns whatever it accumulated, and the termination
//! variant tells the caller why it stopped.

use crate::client::{Operation, SearchOrder, VideoApi};
use crate::VideoRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum results per search page, imposed by the API.
const PAGE_SIZE: u32 = 50;

/// Why a query's pagination stopped.
#[derive(Debug)]
pub enum QueryTermination {
    /// The result stream ran dry or the target count was reached
    Exhausted,
    /// The budget ran out, locally or remotely; collection may resume after
    /// the platform's daily rollover
    QuotaBlocked,
    /// A non-quota failure interrupted pagination; carries the message for
    /// the caller's error log
    Failed(String),
}

/// Result of paginating one query: the collected records plus why the
/// collection stopped. Never an error; partial work is always preserved.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Collected records, capped at the requested target
    pub videos: Vec<VideoRecord>,
    /// Terminal state of the pagination loop
    pub termination: QueryTermination,
}

impl QueryOutcome {
    /// Whether the query stopped because the budget ran out.
    pub fn is_quota_blocked(&self) -> bool {
        matches!(self.termination, QueryTermination::QuotaBlocked)
    }
}

/// Drives paginated search for one query at a time.
pub struct VideoCollector {
    client: Arc<dyn VideoApi>,
}

impl VideoCollector {
    /// Create a collector over the given API gateway.
    pub fn new(client: Arc<dyn VideoApi>) -> Self {
        Self { client }
    }

    /// Collect up to `target` videos for `query`.
    ///
    /// Each page requests `min(50, target - collected)` results. Items
    /// without a resolvable video ID are dropped silently. The output never
    /// exceeds `target`, even when the final page overshoots.
    pub async fn collect(&self, query: &str, target: usize, order: SearchOrder) -> QueryOutcome {
        let mut videos: Vec<VideoRecord> = Vec::new();
        let mut page_token: Option<String> = None;

        info!(query, target, "starting video search");

        let termination = loop {
            if videos.len() >= target {
                break QueryTermination::Exhausted;
            }

            // Local pre-check before every page so exhaustion is observed
            // between calls, not discovered by a wasted request.
            if !self.client.can_afford(Operation::Search) {
                warn!(
                    query,
                    collected = videos.len(),
                    "quota limit reached, stopping collection"
                );
                break QueryTermination::QuotaBlocked;
            }

            let remaining = target - videos.len();
            let page_size = PAGE_SIZE.min(remaining as u32);

            let page = match self
                .client
                .search_page(query, page_size, page_token.as_deref(), order)
                .await
            {
                Ok(page) => page,
                Err(e) if e.is_quota() => {
                    warn!(query, error = %e, "quota exceeded, stopping collection");
                    break QueryTermination::QuotaBlocked;
                }
                Err(e) => {
                    warn!(query, error = %e, "search failed, keeping partial results");
                    break QueryTermination::Failed(e.to_string());
                }
            };

            let had_items = !page.items.is_empty();
            videos.extend(page.items.into_iter().filter(VideoRecord::has_video_id));

            info!(
                query,
                collected = videos.len(),
                target,
                "search progress"
            );

            if !had_items {
                info!(query, total = videos.len(), "no more results");
                break QueryTermination::Exhausted;
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                info!(query, total = videos.len(), "reached end of results");
                break QueryTermination::Exhausted;
            }
        };

        videos.truncate(target);
        info!(query, collected = videos.len(), "video search finished");

        QueryOutcome {
            videos,
            termination,
        }
    }
}
