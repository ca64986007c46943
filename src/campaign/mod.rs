//! Checkpointed campaign orchestration
//!
//! A campaign is one end-to-end run attempting to collect data for a list
//! of queries. Progress is persisted after every query, so an interrupted
//! run resumes by skipping the queries already in the checkpoint.
//!
//! # Components
//!
//! - [`runner`] - The query loop, channel phase, and export phase
//! - [`checkpoint`] - Atomic checkpoint persistence
//! - [`status`] - The status snapshot readers poll while a campaign runs
//! - [`stop`] - Cooperative cancellation checked at query boundaries

pub mod checkpoint;
pub mod runner;
pub mod status;
pub mod stop;

pub use checkpoint::{CampaignCheckpoint, CheckpointError};
pub use runner::{CampaignConfig, CampaignReport, CampaignRunner};
pub use status::{CampaignStatus, StatusHandle};
pub use stop::{SharedStopSignal, StopSignal};

/// Campaign errors.
///
/// Deliberately narrow: quota exhaustion and per-query transport failures
/// are expected outcomes recorded in the status error log, not errors. Only
/// losing the ability to persist progress aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// The checkpoint could not be written; resumability is void
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}
