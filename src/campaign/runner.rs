//! Campaign orchestration
//!
//! The runner walks an ordered list of search queries, persists the
//! checkpoint after every one, and stops the whole campaign early when the
//! remaining budget cannot cover another query. Any terminal query state
//! still yields a result list; collected work is never discarded.

use super::checkpoint::CampaignCheckpoint;
use super::status::StatusHandle;
use super::stop::SharedStopSignal;
use super::CampaignError;
use crate::client::{QuotaUsage, SearchOrder, VideoApi};
use crate::config::{DEFAULT_QUOTA_RESERVE, DEFAULT_VIDEOS_PER_QUERY};
use crate::extract::{ChannelCollector, QueryTermination, VideoCollector};
use crate::output;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Parameters for one campaign run.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// Ordered, distinct search phrases
    pub queries: Vec<String>,
    /// Target video count per query
    pub videos_per_query: usize,
    /// Search result ordering
    pub order: SearchOrder,
    /// Checkpoint file path
    pub checkpoint_path: PathBuf,
    /// Output directory for CSV exports and the summary report
    pub data_dir: PathBuf,
    /// Minimum quota that must remain before starting another query
    pub quota_reserve: u32,
    /// Whether to export CSVs and a summary report after collection
    pub export: bool,
}

impl CampaignConfig {
    /// Create a config with library defaults for target count, ordering,
    /// and quota reserve.
    pub fn new(queries: Vec<String>, checkpoint_path: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            queries,
            videos_per_query: DEFAULT_VIDEOS_PER_QUERY,
            order: SearchOrder::Date,
            checkpoint_path,
            data_dir,
            quota_reserve: DEFAULT_QUOTA_RESERVE,
            export: true,
        }
    }

    /// Override the per-query target count.
    pub fn with_videos_per_query(mut self, target: usize) -> Self {
        self.videos_per_query = target;
        self
    }

    /// Override the search ordering.
    pub fn with_order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    /// Override the pre-query quota reserve.
    pub fn with_quota_reserve(mut self, reserve: u32) -> Self {
        self.quota_reserve = reserve;
        self
    }

    /// Enable or disable the export phase.
    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }
}

/// Summary of a finished campaign run.
#[derive(Debug)]
pub struct CampaignReport {
    /// Queries present in the checkpoint when the run ended
    pub completed_queries: Vec<String>,
    /// Total videos collected across completed queries
    pub videos_collected: usize,
    /// Channel profiles collected
    pub channels_collected: usize,
    /// Final quota usage
    pub quota: QuotaUsage,
    /// Whether the run stopped on a quota-exhaustion signal
    pub quota_exceeded: bool,
    /// Files written by the export phase
    pub exported_files: Vec<PathBuf>,
}

/// Orchestrates one campaign: video collection per query, channel
/// aggregation, export, and checkpoint retirement.
///
/// The runner exclusively owns the in-memory checkpoint during a run and is
/// the sole writer of both the checkpoint file and the status snapshot.
pub struct CampaignRunner {
    client: Arc<dyn VideoApi>,
    status: StatusHandle,
    stop: SharedStopSignal,
}

impl CampaignRunner {
    /// Create a runner over the given gateway, status handle, and stop
    /// signal.
    pub fn new(client: Arc<dyn VideoApi>, status: StatusHandle, stop: SharedStopSignal) -> Self {
        Self {
            client,
            status,
            stop,
        }
    }

    /// The status handle readers can poll while the campaign runs.
    pub fn status(&self) -> &StatusHandle {
        &self.status
    }

    /// Run the campaign to completion or early halt.
    ///
    /// Queries already present in the checkpoint are skipped; the rest run
    /// in list order. The checkpoint is persisted after every query, so a
    /// crash loses at most the in-flight query's partial work.
    ///
    /// # Errors
    /// Only a checkpoint write failure aborts the run; every other failure
    /// degrades to a recorded error and partial results.
    pub async fn run(&self, config: &CampaignConfig) -> Result<CampaignReport, CampaignError> {
        let mut checkpoint = CampaignCheckpoint::load(&config.checkpoint_path);
        let remaining = checkpoint.remaining_queries(&config.queries);

        if !checkpoint.completed_queries().is_empty() {
            info!(
                completed = checkpoint.completed_queries().len(),
                remaining = remaining.len(),
                "resuming from previous session"
            );
        } else {
            info!(queries = config.queries.len(), "starting fresh extraction");
        }

        let total_queries = config.queries.len();
        let usage = self.client.quota_usage();
        self.status.update(|status| {
            *status = super::status::CampaignStatus {
                is_running: true,
                current_query: None,
                progress_percent: progress_percent(checkpoint.completed_queries().len(), total_queries),
                total_queries,
                completed_queries: checkpoint.completed_queries().to_vec(),
                videos_collected: checkpoint.total_videos(),
                channels_collected: 0,
                quota_used: usage.used,
                quota_limit: usage.limit,
                quota_exceeded: false,
                errors: Vec::new(),
                started_at: Some(Utc::now()),
                last_updated: None,
            };
        });

        let mut quota_blocked = false;
        let collector = VideoCollector::new(self.client.clone());

        for query in &remaining {
            // Cooperative stop, honored only between queries.
            if self.stop.is_stop_requested() {
                info!("stop requested, halting before next query");
                self.status
                    .record_error("campaign stopped by operator request");
                break;
            }

            let usage = self.client.quota_usage();
            self.status.update(|status| status.quota_used = usage.used);

            if usage.remaining < config.quota_reserve {
                warn!(
                    remaining = usage.remaining,
                    reserve = config.quota_reserve,
                    "insufficient quota to start another query, halting campaign"
                );
                self.status.record_error(format!(
                    "insufficient quota remaining ({} units); resume after the daily reset",
                    usage.remaining
                ));
                break;
            }

            info!(query = query.as_str(), "processing query");
            self.status
                .update(|status| status.current_query = Some(query.clone()));

            let outcome = collector
                .collect(query, config.videos_per_query, config.order)
                .await;
            let blocked = outcome.is_quota_blocked();
            if let QueryTermination::Failed(message) = &outcome.termination {
                self.status
                    .record_error(format!("query '{query}': {message}"));
            }

            // A quota-blocked or failed query still completes with its
            // partial data; retrying it would re-spend budget on the pages
            // already collected.
            checkpoint.record_query(query, outcome.videos);
            checkpoint.save(&config.checkpoint_path)?;

            let usage = self.client.quota_usage();
            self.status.update(|status| {
                status.completed_queries = checkpoint.completed_queries().to_vec();
                status.videos_collected = checkpoint.total_videos();
                status.progress_percent =
                    progress_percent(checkpoint.completed_queries().len(), total_queries);
                status.quota_used = usage.used;
            });

            if blocked {
                quota_blocked = true;
                self.status.update(|status| status.quota_exceeded = true);
                self.status.record_error(format!(
                    "quota exceeded during '{query}'; progress saved, resume after the daily reset"
                ));
                break;
            }
        }

        // Channel phase: skipped when the video phase ran out of budget,
        // since its batches would be refused anyway.
        let mut channels = Vec::new();
        if checkpoint.total_videos() > 0 && !quota_blocked {
            self.status.update(|status| {
                status.current_query = Some("Collecting channel data...".to_string())
            });

            let outcome = ChannelCollector::new(self.client.clone())
                .collect(checkpoint.video_data())
                .await;
            for error in outcome.errors {
                self.status.record_error(error);
            }
            if outcome.quota_blocked {
                self.status.update(|status| status.quota_exceeded = true);
                self.status.record_error(
                    "quota exceeded during channel collection; video data is saved",
                );
            }
            channels = outcome.channels;

            let usage = self.client.quota_usage();
            self.status.update(|status| {
                status.channels_collected = channels.len();
                status.quota_used = usage.used;
            });
        }

        // Export phase. Collected data is already durable in the
        // checkpoint, so export failures are recorded rather than fatal.
        let mut exported_files = Vec::new();
        if config.export && checkpoint.total_videos() > 0 && !quota_blocked {
            match output::export_dataset(
                &config.data_dir,
                checkpoint.video_data(),
                &channels,
                &self.client.quota_usage(),
            ) {
                Ok(files) => exported_files = files,
                Err(e) => self.status.record_error(format!("export failed: {e}")),
            }
        }

        // Retirement requires both full coverage and an intact budget: a
        // campaign that quota-blocked on its final query keeps the
        // checkpoint so a resume after rollover can run the channel and
        // export phases over the saved data.
        let complete = checkpoint.is_complete(&config.queries) && !quota_blocked;
        if complete {
            CampaignCheckpoint::retire(&config.checkpoint_path);
        }

        let usage = self.client.quota_usage();
        self.status.update(|status| {
            status.is_running = false;
            status.current_query = None;
            status.quota_used = usage.used;
            if complete {
                status.progress_percent = 100;
            }
        });

        let snapshot = self.status.snapshot();
        info!(
            completed = snapshot.completed_queries.len(),
            videos = snapshot.videos_collected,
            channels = snapshot.channels_collected,
            quota_used = usage.used,
            "campaign finished"
        );

        Ok(CampaignReport {
            completed_queries: checkpoint.completed_queries().to_vec(),
            videos_collected: checkpoint.total_videos(),
            channels_collected: channels.len(),
            quota: usage,
            quota_exceeded: snapshot.quota_exceeded,
            exported_files,
        })
    }
}

fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed * 100) / total).min(100) as u8
}
