//! Serve command implementation

use super::CliError;
use crate::config::Settings;
use crate::server::{self, ExtractionService};
use clap::Parser;
use std::sync::Arc;

/// Arguments for the serve command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to bind (overrides the PORT environment variable)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Run the HTTP service until the process is stopped.
    pub async fn execute(&self) -> Result<(), CliError> {
        let settings = Settings::from_env()?;
        let port = self.port.unwrap_or(settings.port);

        let service = Arc::new(ExtractionService::new(settings));
        server::serve(service, port).await?;
        Ok(())
    }
}
