//! Validate command implementation
//!
//! Pre-flight checks run before starting a long extraction: credential
//! present, data directory writable, existing checkpoint readable. Prints a
//! check-by-check report and fails when anything is broken.

use super::CliError;
use crate::campaign::CampaignCheckpoint;
use crate::config::{ConfigError, Settings, API_KEY_VAR};
use clap::Parser;
use std::path::Path;

/// Arguments for the validate command.
#[derive(Parser, Debug)]
pub struct ValidateCommand {}

impl ValidateCommand {
    /// Run all pre-flight checks.
    pub async fn execute(&self) -> Result<(), CliError> {
        let mut failures = 0usize;

        let settings = match Settings::from_env() {
            Ok(settings) => {
                println!("✓ {API_KEY_VAR} is configured");
                Some(settings)
            }
            Err(ConfigError::MissingApiKey) => {
                println!("✗ {API_KEY_VAR} is missing or still the placeholder");
                println!("  Create a .env file and add your YouTube Data API key");
                failures += 1;
                None
            }
            Err(e) => {
                println!("✗ configuration error: {e}");
                failures += 1;
                None
            }
        };

        if let Some(settings) = &settings {
            if check_data_dir(&settings.data_dir) {
                println!("✓ data directory is writable: {}", settings.data_dir.display());
            } else {
                println!(
                    "✗ data directory is not writable: {}",
                    settings.data_dir.display()
                );
                failures += 1;
            }

            if settings.checkpoint_path.exists() {
                let checkpoint = CampaignCheckpoint::load(&settings.checkpoint_path);
                if checkpoint.completed_queries().is_empty() {
                    println!(
                        "✓ checkpoint file exists but holds no completed queries: {}",
                        settings.checkpoint_path.display()
                    );
                } else {
                    println!(
                        "✓ resumable checkpoint found: {} completed queries, {} videos",
                        checkpoint.completed_queries().len(),
                        checkpoint.total_videos()
                    );
                }
            } else {
                println!("✓ no checkpoint file; a campaign will start fresh");
            }
        }

        if failures > 0 {
            return Err(CliError::Validation(format!(
                "{failures} check(s) failed; fix the issues above and re-run"
            )));
        }

        println!("\nAll checks passed. Ready to extract.");
        Ok(())
    }
}

fn check_data_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write_probe");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
