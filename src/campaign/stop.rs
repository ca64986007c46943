//! Cooperative campaign cancellation
//!
//! A stop request is checked only at query boundaries: the runner finishes
//! the current query's persistence step, then halts before starting the
//! next. There is no hard interrupt of an in-flight remote call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared handle to a stop signal.
pub type SharedStopSignal = Arc<StopSignal>;

/// One-shot stop flag shared between the runner and its controllers
/// (Ctrl-C handler, HTTP stop route).
#[derive(Debug, Default)]
pub struct StopSignal {
    requested: AtomicBool,
}

impl StopSignal {
    /// Create a fresh signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh signal wrapped in [`Arc`].
    pub fn shared() -> SharedStopSignal {
        Arc::new(Self::new())
    }

    /// Request that the campaign halt at the next query boundary.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Clear the flag so the signal can gate a new campaign.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}
