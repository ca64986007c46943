//! Video and channel extraction passes
//!
//! The [`videos`] module drives paginated search for one query at a time;
//! the [`channels`] module derives the unique channel set from collected
//! videos and fetches profiles in fixed-size batches. Both degrade to
//! partial results when the quota budget runs out mid-pass.

pub mod channels;
pub mod videos;

pub use channels::{ChannelCollector, ChannelOutcome};
pub use videos::{QueryOutcome, QueryTermination, VideoCollector};
