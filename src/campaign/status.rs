//! Campaign status reporting
//!
//! The runner is the sole writer of the status snapshot; the HTTP layer and
//! CLI hold the same handle and only read. This replaces the ambient global
//! state a monitoring surface might otherwise reach for.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Point-in-time view of a campaign for the reporting surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignStatus {
    /// Whether a campaign is currently running
    pub is_running: bool,
    /// Query currently being collected, if any
    pub current_query: Option<String>,
    /// Completed share of the requested query list, 0-100
    pub progress_percent: u8,
    /// Number of queries in the requested list
    pub total_queries: usize,
    /// Queries completed so far, in completion order
    pub completed_queries: Vec<String>,
    /// Total videos collected across all completed queries
    pub videos_collected: usize,
    /// Channel profiles collected
    pub channels_collected: usize,
    /// Quota units consumed
    pub quota_used: u32,
    /// Daily quota ceiling
    pub quota_limit: u32,
    /// Whether the campaign stopped on a quota-exhaustion signal
    pub quota_exceeded: bool,
    /// Accumulated human-readable error messages
    pub errors: Vec<String>,
    /// When the campaign started
    pub started_at: Option<DateTime<Utc>>,
    /// When the status last changed
    pub last_updated: Option<DateTime<Utc>>,
}

/// Shared read handle over the status snapshot.
///
/// Cloning is cheap; all clones observe the same snapshot. Only the
/// campaign runner mutates it.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<RwLock<CampaignStatus>>,
}

impl StatusHandle {
    /// Create a handle around a fresh status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the current snapshot.
    pub fn snapshot(&self) -> CampaignStatus {
        self.inner.read().expect("status lock poisoned").clone()
    }

    /// Apply a mutation and stamp `last_updated`.
    pub fn update(&self, apply: impl FnOnce(&mut CampaignStatus)) {
        let mut status = self.inner.write().expect("status lock poisoned");
        apply(&mut status);
        status.last_updated = Some(Utc::now());
    }

    /// Append an error message to the running log.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "campaign error recorded");
        self.update(|status| status.errors.push(message));
    }
}
