//! Main entry point for the youtube-data-extractor CLI

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use youtube_data_extractor::campaign::StopSignal;
use youtube_data_extractor::cli::{Cli, Commands};

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("youtube_data_extractor=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // Ctrl+C requests a cooperative stop; the campaign halts at the next
    // query boundary with its checkpoint intact.
    let stop = StopSignal::shared();
    tokio::spawn({
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing current query and saving progress...");
                stop.request_stop();
            }
        }
    });

    let result = match cli.command {
        Commands::Extract(ref args) => args
            .execute(stop.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Serve(ref args) => args.execute().await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Validate(ref cmd) => cmd.execute().await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
