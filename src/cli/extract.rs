//! Extract command implementation
//!
//! Runs a campaign in the foreground with a progress bar fed from the same
//! status handle the HTTP surface reads.

use super::CliError;
use crate::campaign::{CampaignConfig, CampaignRunner, SharedStopSignal, StatusHandle};
use crate::client::http::YouTubeClient;
use crate::client::SearchOrder;
use crate::config::{default_search_phrases, Settings};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Arguments for the extract command.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Search phrase to collect; repeat for several (defaults to the
    /// built-in phrase list)
    #[arg(long = "query", value_name = "PHRASE")]
    pub queries: Vec<String>,

    /// Target video count per query
    #[arg(long, value_name = "COUNT")]
    pub videos_per_query: Option<usize>,

    /// Daily quota budget in units
    #[arg(long, value_name = "UNITS")]
    pub daily_quota: Option<u32>,

    /// Search result ordering (date, rating, relevance, title, viewCount)
    #[arg(long, default_value = "date")]
    pub order: SearchOrder,

    /// Output directory for CSV exports
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Checkpoint file path
    #[arg(long, value_name = "FILE")]
    pub checkpoint: Option<PathBuf>,

    /// Skip the CSV export phase
    #[arg(long)]
    pub no_export: bool,
}

impl ExtractArgs {
    /// Execute the extraction campaign.
    pub async fn execute(&self, stop: SharedStopSignal) -> Result<(), CliError> {
        let settings = Settings::from_env()?;

        let queries = if self.queries.is_empty() {
            default_search_phrases()
        } else {
            self.queries.clone()
        };

        let config = CampaignConfig::new(
            queries,
            self.checkpoint
                .clone()
                .unwrap_or_else(|| settings.checkpoint_path.clone()),
            self.data_dir
                .clone()
                .unwrap_or_else(|| settings.data_dir.clone()),
        )
        .with_videos_per_query(self.videos_per_query.unwrap_or(settings.videos_per_query))
        .with_order(self.order)
        .with_export(!self.no_export);

        let daily_quota = self.daily_quota.unwrap_or(settings.daily_quota);
        let client = Arc::new(YouTubeClient::new(settings.api_key, daily_quota));

        let status = StatusHandle::new();
        let runner = CampaignRunner::new(client, status.clone(), stop);

        let bar = progress_bar(config.queries.len() as u64);
        let watcher = tokio::spawn(watch_progress(status.clone(), bar.clone()));

        let result = runner.run(&config).await;

        watcher.abort();
        bar.finish_and_clear();

        let report = result?;
        info!(
            queries = report.completed_queries.len(),
            videos = report.videos_collected,
            channels = report.channels_collected,
            quota_used = report.quota.used,
            quota_limit = report.quota.limit,
            "extraction finished"
        );
        for path in &report.exported_files {
            info!(path = %path.display(), "wrote");
        }
        if report.quota_exceeded {
            info!("daily quota exhausted; run again after the reset to continue");
        }

        Ok(())
    }
}

fn progress_bar(total_queries: u64) -> ProgressBar {
    let bar = ProgressBar::new(total_queries);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{bar:40.cyan/blue}] {pos}/{len} queries · {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Mirror the status snapshot into the progress bar twice a second. This is
/// the same reader/writer relationship the HTTP monitor has with a running
/// campaign.
async fn watch_progress(status: StatusHandle, bar: ProgressBar) {
    loop {
        let snapshot = status.snapshot();
        bar.set_position(snapshot.completed_queries.len() as u64);
        if let Some(query) = &snapshot.current_query {
            bar.set_message(format!(
                "{} · {} videos · quota {}/{}",
                query, snapshot.videos_collected, snapshot.quota_used, snapshot.quota_limit
            ));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
