//! Daily quota accounting
//!
//! The YouTube Data API v3 prices every operation in abstract quota units
//! against a fixed daily budget. The ledger tracks local consumption so the
//! pipeline can refuse work it cannot afford before spending a network round
//! trip on it. The remote service's own enforcement remains authoritative;
//! this ledger is an optimization, not the source of truth.

use serde::Serialize;

/// API operation kinds with fixed unit costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `search.list` request (one page)
    Search,
    /// `videos.list` batch detail request
    VideoDetails,
    /// `channels.list` batch detail request
    ChannelDetails,
}

impl Operation {
    /// Unit cost of one request of this kind, per the platform's published
    /// pricing. A mismatch here silently corrupts budget arithmetic, so
    /// these values must track the external API.
    pub fn cost(self) -> u32 {
        match self {
            Operation::Search => 100,
            Operation::VideoDetails => 1,
            Operation::ChannelDetails => 1,
        }
    }

    /// Operation name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::VideoDetails => "videoDetails",
            Operation::ChannelDetails => "channelDetails",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks consumed quota units against a fixed daily ceiling.
///
/// Owned by one client session; `used` only grows, only by a registered
/// operation's cost, and only after the corresponding remote call succeeded.
/// The owning client decides when the platform's daily rollover warrants a
/// [`reset`](QuotaLedger::reset).
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    daily_limit: u32,
    used: u32,
    request_count: u32,
}

impl QuotaLedger {
    /// Create a ledger with the given daily limit.
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            used: 0,
            request_count: 0,
        }
    }

    /// Whether the budget covers one more request of this kind. Pure.
    pub fn can_afford(&self, op: Operation) -> bool {
        self.used + op.cost() <= self.daily_limit
    }

    /// Record a successful request.
    ///
    /// Caller contract: invoke only after the remote call has succeeded. A
    /// failed call must not be charged.
    pub fn charge(&mut self, op: Operation) {
        self.used += op.cost();
        self.request_count += 1;
        tracing::debug!(
            operation = op.as_str(),
            cost = op.cost(),
            used = self.used,
            limit = self.daily_limit,
            "quota charged"
        );
    }

    /// Units left in today's budget.
    pub fn remaining(&self) -> u32 {
        self.daily_limit - self.used
    }

    /// Units consumed so far.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// The immutable daily ceiling.
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Successful requests recorded.
    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    /// Zero the counters for the platform's daily rollover.
    ///
    /// Not wired to wall-clock time; the owning process decides when to
    /// call it.
    pub fn reset(&mut self) {
        self.used = 0;
        self.request_count = 0;
        tracing::info!("quota counter reset");
    }

    /// Point-in-time usage snapshot for reporting.
    pub fn usage(&self) -> QuotaUsage {
        QuotaUsage {
            used: self.used,
            limit: self.daily_limit,
            remaining: self.remaining(),
            requests: self.request_count,
        }
    }
}

/// Snapshot of ledger state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    /// Units consumed
    pub used: u32,
    /// Daily ceiling
    pub limit: u32,
    /// Units left
    pub remaining: u32,
    /// Successful requests recorded
    pub requests: u32,
}
