//! Request pacing
//!
//! A courtesy delay between outbound calls, independent of quota state.
//! Applies uniformly to every gateway call type.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum wall-clock interval between consecutive calls.
#[derive(Debug)]
pub struct RateGovernor {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateGovernor {
    /// Create a governor with the given minimum spacing.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Suspend until at least `min_interval` has elapsed since the previous
    /// call returned. The first call never waits.
    pub async fn throttle(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(crate::config::MIN_REQUEST_INTERVAL)
    }
}
