//! Scripted in-memory gateway for integration tests
//!
//! Implements the same charge-on-success contract as the HTTP client: the
//! ledger is charged only when a scripted call succeeds, and the local
//! budget pre-check fails closed without consuming a scripted response.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use youtube_data_extractor::client::{
    ApiError, ApiResult, Operation, QuotaLedger, QuotaUsage, SearchOrder, SearchPage, VideoApi,
    VideoDetails,
};
use youtube_data_extractor::{ChannelRecord, VideoRecord};

/// One scripted response for a search call.
pub enum Scripted {
    /// A successful page
    Page {
        /// Records returned by the platform
        items: Vec<VideoRecord>,
        /// Continuation token, absent on the last page
        next_page_token: Option<String>,
    },
    /// The remote side rejects with its quota marker
    RemoteQuota,
    /// A transport-level failure
    Transport(String),
}

/// Scripted [`VideoApi`] implementation backed by a real [`QuotaLedger`].
pub struct MockApi {
    ledger: Mutex<QuotaLedger>,
    search_scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    channels: Mutex<HashMap<String, ChannelRecord>>,
    fail_channel_batches: Mutex<HashSet<usize>>,
    quota_block_channel_batches: Mutex<HashSet<usize>>,
    duplicate_channel: Mutex<Option<String>>,
    /// Search requests that reached the "remote" side
    pub search_calls: AtomicUsize,
    /// Channel batch requests that reached the "remote" side
    pub channel_calls: AtomicUsize,
    /// Video detail requests that reached the "remote" side
    pub video_calls: AtomicUsize,
    /// Page sizes requested by the driver, in order
    pub requested_page_sizes: Mutex<Vec<u32>>,
    /// Channel ID batches requested, in order
    pub requested_batches: Mutex<Vec<Vec<String>>>,
}

impl MockApi {
    /// Create a mock with the given daily quota.
    pub fn new(daily_quota: u32) -> Self {
        Self {
            ledger: Mutex::new(QuotaLedger::new(daily_quota)),
            search_scripts: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
            fail_channel_batches: Mutex::new(HashSet::new()),
            quota_block_channel_batches: Mutex::new(HashSet::new()),
            duplicate_channel: Mutex::new(None),
            search_calls: AtomicUsize::new(0),
            channel_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
            requested_page_sizes: Mutex::new(Vec::new()),
            requested_batches: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful page for `query`.
    pub fn script_page(&self, query: &str, items: Vec<VideoRecord>, token: Option<&str>) {
        self.search_scripts
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(Scripted::Page {
                items,
                next_page_token: token.map(str::to_string),
            });
    }

    /// Queue an error response for `query`.
    pub fn script_error(&self, query: &str, error: Scripted) {
        self.search_scripts
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(error);
    }

    /// Register a channel profile the mock can serve.
    pub fn add_channel(&self, record: ChannelRecord) {
        self.channels
            .lock()
            .unwrap()
            .insert(record.channel_id.clone(), record);
    }

    /// Make the nth channel batch (0-indexed) fail with a transport error.
    pub fn fail_channel_batch(&self, index: usize) {
        self.fail_channel_batches.lock().unwrap().insert(index);
    }

    /// Make the nth channel batch (0-indexed) fail with a remote quota
    /// rejection.
    pub fn quota_block_channel_batch(&self, index: usize) {
        self.quota_block_channel_batches
            .lock()
            .unwrap()
            .insert(index);
    }

    /// Make every channel batch containing `channel_id` return that record
    /// twice, as a misbehaving platform might.
    pub fn duplicate_channel_in_responses(&self, channel_id: &str) {
        *self.duplicate_channel.lock().unwrap() = Some(channel_id.to_string());
    }

    /// Current ledger snapshot.
    pub fn usage(&self) -> QuotaUsage {
        self.ledger.lock().unwrap().usage()
    }
}

#[async_trait]
impl VideoApi for MockApi {
    async fn search_page(
        &self,
        query: &str,
        max_results: u32,
        _page_token: Option<&str>,
        _order: SearchOrder,
    ) -> ApiResult<SearchPage> {
        {
            let ledger = self.ledger.lock().unwrap();
            if !ledger.can_afford(Operation::Search) {
                return Err(ApiError::InsufficientQuota {
                    remaining: ledger.remaining(),
                    needed: Operation::Search.cost(),
                });
            }
        }

        self.requested_page_sizes.lock().unwrap().push(max_results);
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .search_scripts
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("unscripted search call for query '{query}'"));

        match scripted {
            Scripted::Page {
                items,
                next_page_token,
            } => {
                self.ledger.lock().unwrap().charge(Operation::Search);
                Ok(SearchPage {
                    items,
                    next_page_token,
                })
            }
            Scripted::RemoteQuota => Err(ApiError::QuotaExceeded(
                "daily quota limit exceeded".to_string(),
            )),
            Scripted::Transport(message) => Err(ApiError::Transport(message)),
        }
    }

    async fn fetch_video_details(&self, ids: &[String]) -> ApiResult<Vec<VideoDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        {
            let ledger = self.ledger.lock().unwrap();
            if !ledger.can_afford(Operation::VideoDetails) {
                return Err(ApiError::InsufficientQuota {
                    remaining: ledger.remaining(),
                    needed: Operation::VideoDetails.cost(),
                });
            }
        }
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.ledger.lock().unwrap().charge(Operation::VideoDetails);

        Ok(ids
            .iter()
            .map(|id| VideoDetails {
                video_id: id.clone(),
                title: format!("video {id}"),
                duration: "PT4M33S".to_string(),
                view_count: "100".to_string(),
                like_count: "10".to_string(),
                comment_count: "1".to_string(),
            })
            .collect())
    }

    async fn fetch_channel_details(&self, ids: &[String]) -> ApiResult<Vec<ChannelRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        {
            let ledger = self.ledger.lock().unwrap();
            if !ledger.can_afford(Operation::ChannelDetails) {
                return Err(ApiError::InsufficientQuota {
                    remaining: ledger.remaining(),
                    needed: Operation::ChannelDetails.cost(),
                });
            }
        }

        let call_index = self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_batches.lock().unwrap().push(ids.to_vec());

        if self
            .quota_block_channel_batches
            .lock()
            .unwrap()
            .contains(&call_index)
        {
            return Err(ApiError::QuotaExceeded(
                "daily quota limit exceeded".to_string(),
            ));
        }
        if self.fail_channel_batches.lock().unwrap().contains(&call_index) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }

        self.ledger.lock().unwrap().charge(Operation::ChannelDetails);

        let channels = self.channels.lock().unwrap();
        let duplicate = self.duplicate_channel.lock().unwrap().clone();
        let mut records = Vec::new();
        for id in ids {
            let record = channels
                .get(id)
                .cloned()
                .unwrap_or_else(|| channel_record(id, "0"));
            if duplicate.as_deref() == Some(id.as_str()) {
                records.push(record.clone());
            }
            records.push(record);
        }
        Ok(records)
    }

    fn can_afford(&self, op: Operation) -> bool {
        self.ledger.lock().unwrap().can_afford(op)
    }

    fn quota_usage(&self) -> QuotaUsage {
        self.ledger.lock().unwrap().usage()
    }
}

/// Build a video record pointing at `channel_id`.
pub fn video(id: &str, channel_id: &str) -> VideoRecord {
    VideoRecord {
        video_id: id.to_string(),
        title: format!("Video {id}"),
        description: String::new(),
        published_at: "2024-01-15T09:00:00Z".to_string(),
        channel_title: format!("Channel {channel_id}"),
        channel_id: channel_id.to_string(),
    }
}

/// Build `count` records with IDs `prefix0..prefixN`, cycling through the
/// given channel IDs.
pub fn videos(prefix: &str, count: usize, channel_ids: &[&str]) -> Vec<VideoRecord> {
    (0..count)
        .map(|i| video(&format!("{prefix}{i}"), channel_ids[i % channel_ids.len()]))
        .collect()
}

/// Build a channel profile.
pub fn channel_record(id: &str, subscribers: &str) -> ChannelRecord {
    ChannelRecord {
        channel_id: id.to_string(),
        title: format!("Channel {id}"),
        description: String::new(),
        published_at: "2015-01-01T00:00:00Z".to_string(),
        country: "GB".to_string(),
        custom_url: String::new(),
        view_count: "1000".to_string(),
        subscriber_count: subscribers.to_string(),
        video_count: "25".to_string(),
        hidden_subscriber_count: false,
        channel_url: ChannelRecord::url_for(id),
    }
}
