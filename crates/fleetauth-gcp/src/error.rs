//! Errors raised while talking to Google Cloud endpoints

use fleetauth::FleetAuthError;
use thiserror::Error;

/// Result alias for this crate
pub type GcpResult<T> = std::result::Result<T, GcpError>;

/// Failures of the metadata server and IAM Credentials clients
#[derive(Error, Debug)]
pub enum GcpError {
    /// Transport-level failure: connection, timeout, TLS, body read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The endpoint answered with a body of the wrong shape
    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// An endpoint URL could not be built
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GcpError {
    /// Report this failure as a signing failure of `identity`
    pub fn into_signing_failure(self, identity: &str) -> FleetAuthError {
        FleetAuthError::signing(identity, self)
    }

    /// Whether the endpoint refused on authorization grounds
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
