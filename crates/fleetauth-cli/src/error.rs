//! Error types for CLI operations

use thiserror::Error;

/// Result alias for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;

/// Failures surfaced to the terminal
#[derive(Error, Debug)]
pub enum CliError {
    /// Minting, signing or decoding failed
    #[error(transparent)]
    Mint(#[from] fleetauth::FleetAuthError),

    /// Cloud signer setup failed
    #[error("GCP error: {0}")]
    Gcp(#[from] fleetauth_gcp::GcpError),

    /// Settings could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Reading a key file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
