use serde::Deserialize;
use std::fmt;

use sodasync_config::shared::{
    DestinationConfig, PipelineConfig, SourceConfig, ValidationError,
};

/// Complete configuration for the sync trigger service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server settings.
    pub application: ApplicationSettings,
    /// Pipeline identity and retry policies.
    pub pipeline: PipelineConfig,
    /// Source API settings.
    pub source: SourceConfig,
    /// Destination settings.
    pub destination: DestinationConfig,
}

impl ServerConfig {
    /// Validates every section, failing fast at startup instead of on the
    /// first triggered run.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()?;

        Ok(())
    }
}

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host address the server listens on.
    pub host: String,
    /// Port number the server listens on.
    pub port: u16,
}

impl fmt::Display for ApplicationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
