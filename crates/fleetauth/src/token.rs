//! Token value and role tags

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;

/// Audience written into tokens when none is configured
pub const DEFAULT_JWT_AUDIENCE: &str = "https://fleetengine.googleapis.com/";

/// Absolute lifetime of every minted token
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Backend role a token is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Ride-hailing backend super user
    Server,
    /// Ride-hailing driver app
    Driver,
    /// Ride-hailing consumer app
    Consumer,
    /// Delivery backend super user
    DeliveryServer,
    /// Delivery consumer app
    DeliveryConsumer,
    /// Delivery driver app running on an unmanaged device
    UntrustedDeliveryDriver,
    /// Delivery driver app running on a managed device
    TrustedDeliveryDriver,
    /// Read-only access to delivery fleet data
    DeliveryFleetReader,
    /// Read-only access to ride-hailing fleet data
    FleetReader,
    /// Any role outside the standard set
    Custom,
}

impl TokenType {
    /// Stable lower-case name, used in logs and error messages
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Driver => "driver",
            Self::Consumer => "consumer",
            Self::DeliveryServer => "delivery_server",
            Self::DeliveryConsumer => "delivery_consumer",
            Self::UntrustedDeliveryDriver => "untrusted_delivery_driver",
            Self::TrustedDeliveryDriver => "trusted_delivery_driver",
            Self::DeliveryFleetReader => "delivery_fleet_reader",
            Self::FleetReader => "fleet_reader",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authorization token, signed or not.
///
/// Built unsigned by a [`TokenFactory`](crate::TokenFactory); a
/// [`Signer`](crate::Signer) returns a copy carrying the JWT. The expiration
/// is fixed at creation to [`TOKEN_LIFETIME`] after the creation time.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    created_at: SystemTime,
    expires_at: SystemTime,
    audience: String,
    jwt: Option<String>,
    token_type: TokenType,
    claims: TokenClaims,
}

impl Token {
    /// Create an unsigned token created at `created_at`
    pub fn unsigned(
        token_type: TokenType,
        claims: TokenClaims,
        audience: impl Into<String>,
        created_at: SystemTime,
    ) -> Self {
        Self {
            created_at,
            expires_at: created_at + TOKEN_LIFETIME,
            audience: audience.into(),
            jwt: None,
            token_type,
            claims,
        }
    }

    /// Copy of this token carrying `jwt`
    pub fn with_jwt(&self, jwt: impl Into<String>) -> Self {
        Self {
            jwt: Some(jwt.into()),
            ..self.clone()
        }
    }

    /// Creation time (`iat`)
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Expiration time (`exp`)
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Creation time in seconds since the Unix epoch
    pub fn issued_at_secs(&self) -> u64 {
        epoch_secs(self.created_at)
    }

    /// Expiration time in seconds since the Unix epoch
    pub fn expires_at_secs(&self) -> u64 {
        epoch_secs(self.expires_at)
    }

    /// Audience (`aud`)
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Signed JWT, absent until a signer produced it
    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }

    /// Whether a signer has populated the JWT
    pub fn is_signed(&self) -> bool {
        self.jwt.is_some()
    }

    /// Role this token is scoped to
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Authorization scope
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// `Bearer <jwt>` header value for signed tokens
    pub fn authorization_header(&self) -> Option<String> {
        self.jwt.as_ref().map(|jwt| format!("Bearer {jwt}"))
    }
}

// The JWT is a bearer credential and stays out of Debug output.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("audience", &self.audience)
            .field("created_at", &self.issued_at_secs())
            .field("expires_at", &self.expires_at_secs())
            .field("signed", &self.is_signed())
            .field("claims", &self.claims.to_map())
            .finish()
    }
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
