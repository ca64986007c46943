//! CLI command implementations

use clap::{Parser, Subcommand};

pub mod error;
pub mod extract;
pub mod serve;
pub mod validate;

pub use error::CliError;
pub use extract::ExtractArgs;
pub use serve::ServeArgs;
pub use validate::ValidateCommand;

/// YouTube dataset extractor command line interface.
#[derive(Parser, Debug)]
#[command(name = "youtube-data-extractor", version, about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an extraction campaign in the foreground
    Extract(ExtractArgs),
    /// Serve the HTTP control and analytics API
    Serve(ServeArgs),
    /// Check that the environment is ready to run
    Validate(ValidateCommand),
}
