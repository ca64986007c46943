//! Channel aggregation pass
//!
//! Given all collected video data, derives the set of distinct channel IDs
//! referenced and fetches their profiles in fixed-size batches. The sorted
//! ID order makes batch membership reproducible across runs.

use crate::client::{Operation, VideoApi};
use crate::{ChannelRecord, VideoRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum channel IDs per detail request, imposed by the API.
const BATCH_SIZE: usize = 50;

/// Result of the channel pass.
#[derive(Debug, Default)]
pub struct ChannelOutcome {
    /// Fetched profiles, at most one per distinct channel ID
    pub channels: Vec<ChannelRecord>,
    /// Whether the pass stopped early because the budget ran out
    pub quota_blocked: bool,
    /// Per-batch failure messages for the caller's error log
    pub errors: Vec<String>,
}

/// Fetches channel profiles for the channels referenced by collected videos.
pub struct ChannelCollector {
    client: Arc<dyn VideoApi>,
}

impl ChannelCollector {
    /// Create a collector over the given API gateway.
    pub fn new(client: Arc<dyn VideoApi>) -> Self {
        Self { client }
    }

    /// Distinct non-empty channel IDs across every record of every query,
    /// sorted lexicographically.
    pub fn unique_channel_ids(video_data: &BTreeMap<String, Vec<VideoRecord>>) -> Vec<String> {
        let mut ids = BTreeSet::new();
        let mut total_videos = 0usize;
        for videos in video_data.values() {
            total_videos += videos.len();
            for video in videos {
                let channel_id = video.channel_id.trim();
                if !channel_id.is_empty() {
                    ids.insert(channel_id.to_string());
                }
            }
        }

        info!(
            videos = total_videos,
            channels = ids.len(),
            "extracted unique channel IDs"
        );
        ids.into_iter().collect()
    }

    /// Fetch profiles for every channel referenced in `video_data`.
    ///
    /// Batches run in ID order. Budget exhaustion (local or remote) stops
    /// the pass with whatever was collected; any other batch failure is
    /// recorded and skipped so a single bad batch does not abort the pass.
    pub async fn collect(&self, video_data: &BTreeMap<String, Vec<VideoRecord>>) -> ChannelOutcome {
        let ids = Self::unique_channel_ids(video_data);
        if ids.is_empty() {
            warn!("no channel IDs found in video data");
            return ChannelOutcome::default();
        }

        let total_batches = ids.len().div_ceil(BATCH_SIZE);
        info!(
            channels = ids.len(),
            batches = total_batches,
            "fetching channel details"
        );

        let mut outcome = ChannelOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for (batch_num, batch) in ids.chunks(BATCH_SIZE).enumerate() {
            if !self.client.can_afford(Operation::ChannelDetails) {
                warn!(
                    collected = outcome.channels.len(),
                    "quota limit reached, stopping channel collection"
                );
                outcome.quota_blocked = true;
                break;
            }

            match self.client.fetch_channel_details(batch).await {
                Ok(records) => {
                    let fetched = records.len();
                    for record in records {
                        // The platform should not return duplicates within
                        // correctly partitioned batches, but don't assume it.
                        if seen.insert(record.channel_id.clone()) {
                            outcome.channels.push(record);
                        }
                    }
                    info!(
                        batch = batch_num + 1,
                        total_batches,
                        fetched,
                        collected = outcome.channels.len(),
                        "channel batch complete"
                    );
                }
                Err(e) if e.is_quota() => {
                    warn!(error = %e, "quota exceeded, stopping channel collection");
                    outcome.quota_blocked = true;
                    break;
                }
                Err(e) => {
                    warn!(batch = batch_num + 1, error = %e, "channel batch failed, skipping");
                    outcome
                        .errors
                        .push(format!("channel batch {} failed: {e}", batch_num + 1));
                }
            }
        }

        info!(
            channels = outcome.channels.len(),
            "channel data collection complete"
        );
        outcome
    }
}
