//! Configuration loading and defaults
//!
//! Settings come from the environment (a `.env` file is honored when
//! present). A missing API key is a startup-time fatal condition for the
//! whole pipeline, not a per-call error.

use std::path::PathBuf;
use std::time::Duration;

/// Default daily quota budget for the YouTube Data API v3.
/// The platform grants 10,000 units per project per day.
pub const DEFAULT_DAILY_QUOTA: u32 = 10_000;

/// Default number of videos to collect per search phrase.
pub const DEFAULT_VIDEOS_PER_QUERY: usize = 2_000;

/// Minimum quota that must remain before starting another query.
/// Collecting 2,000 videos takes ~40 search pages at 100 units each, so
/// 4,000 units is a conservative one-query reserve.
pub const DEFAULT_QUOTA_RESERVE: u32 = 4_000;

/// Minimum wall-clock spacing between outbound API calls.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Default checkpoint file path.
pub const DEFAULT_CHECKPOINT_FILE: &str = "extraction_progress.json";

/// Default output directory for CSV exports and reports.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// The built-in choral/classical search phrases the dataset is built from.
pub fn default_search_phrases() -> Vec<String> {
    [
        "Beethoven Symphony",
        "Handel Messiah",
        "Mozart Requiem",
        "Mozart Coronation Mass",
        "Bach St Matthew Passion",
        "Bach St John Passion",
        "Brahms A German Requiem",
        "Haydn The Creation",
        "Haydn The Seasons",
        "Faure Requiem",
        "Faure Cantique de Jean Racine",
        "Vivaldi Gloria",
        "Bach Magnificat",
        "Mendelssohn Elijah",
        "Schubert Mass",
        "Beethoven Missa Solemnis",
        "Mozart Ave Verum",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API credential for the YouTube Data API
    pub api_key: String,
    /// Daily quota budget in units
    pub daily_quota: u32,
    /// Target video count per search phrase
    pub videos_per_query: usize,
    /// Directory for CSV exports and summary reports
    pub data_dir: PathBuf,
    /// Campaign checkpoint file
    pub checkpoint_path: PathBuf,
    /// Bind port for the HTTP service
    pub port: u16,
}

impl Settings {
    /// Resolve settings from the environment.
    ///
    /// Loads a `.env` file when one exists, then reads:
    ///
    /// - `YOUTUBE_API_KEY` (required)
    /// - `DAILY_QUOTA` (default 10,000)
    /// - `VIDEOS_PER_QUERY` (default 2,000)
    /// - `DATA_DIR` (default `data`)
    /// - `CHECKPOINT_FILE` (default `extraction_progress.json`)
    /// - `PORT` (default 8000)
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingApiKey`] when the credential is absent
    /// or still the placeholder value, and [`ConfigError::Invalid`] when a
    /// numeric override does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        if api_key.trim().is_empty() || api_key == "your_api_key_here" {
            return Err(ConfigError::MissingApiKey);
        }

        let daily_quota = parse_env("DAILY_QUOTA", DEFAULT_DAILY_QUOTA)?;
        let videos_per_query = parse_env("VIDEOS_PER_QUERY", DEFAULT_VIDEOS_PER_QUERY)?;
        let port = parse_env("PORT", 8000u16)?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let checkpoint_path = std::env::var("CHECKPOINT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CHECKPOINT_FILE));

        Ok(Self {
            api_key,
            daily_quota,
            videos_per_query,
            data_dir,
            checkpoint_path,
            port,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{name} is not a valid number: {raw}"))),
        Err(_) => Ok(default),
    }
}

/// Configuration errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API credential is absent from the environment
    #[error("YouTube API key not provided; set {API_KEY_VAR} in the environment or .env file")]
    MissingApiKey,

    /// A setting was present but unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
