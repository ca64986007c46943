//! CLI error types and conversions

use crate::analysis::AnalysisError;
use crate::campaign::CampaignError;
use crate::client::ApiError;
use crate::config::ConfigError;
use crate::output::OutputError;

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Campaign error
    #[error("campaign error: {0}")]
    Campaign(#[from] CampaignError),

    /// API client error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Analysis error
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment validation failure
    #[error("validation failed: {0}")]
    Validation(String),
}
