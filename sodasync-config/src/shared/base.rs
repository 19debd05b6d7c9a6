use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// General configuration validation error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid source configuration.
    #[error("Invalid source configuration: {0}")]
    InvalidSource(String),

    /// Invalid destination configuration.
    #[error("Invalid destination configuration: {0}")]
    InvalidDestination(String),
}
