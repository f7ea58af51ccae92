//! Error types for token minting

use thiserror::Error;

use crate::token::TokenType;

/// Result type for minting operations
pub type Result<T> = std::result::Result<T, FleetAuthError>;

/// Failures surfaced by claims construction, minting and signing.
///
/// None of these are retried by the crate. A failed signature leaves the
/// wildcard cache untouched, so the next call starts from scratch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FleetAuthError {
    /// A claim was built from an empty or absent id, or claims of the wrong
    /// kind were handed to a role.
    #[error("Invalid claim '{claim}': {reason}")]
    InvalidClaim { claim: String, reason: String },

    /// The minter was never given a signer for this role.
    #[error("No signer configured for {0} tokens")]
    SignerNotConfigured(TokenType),

    /// The signing backend rejected or could not complete the operation.
    #[error("Signing as '{identity}' failed: {reason}")]
    SigningFailure { identity: String, reason: String },

    /// A JWT handed to the unverified decoder is not well formed.
    #[error("Malformed JWT: {0}")]
    MalformedJwt(String),
}

impl FleetAuthError {
    pub(crate) fn invalid_claim(claim: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidClaim {
            claim: claim.into(),
            reason: reason.into(),
        }
    }

    /// Build a signing failure for `identity`
    pub fn signing(identity: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SigningFailure {
            identity: identity.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether calling again may succeed. Only backend failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SigningFailure { .. })
    }

    /// Stable category name for structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidClaim { .. } => "invalid_claim",
            Self::SignerNotConfigured(_) => "signer_not_configured",
            Self::SigningFailure { .. } => "signing_failure",
            Self::MalformedJwt(_) => "malformed_jwt",
        }
    }
}
