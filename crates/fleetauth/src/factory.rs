//! Unsigned token construction
//!
//! One operation per role. Each stamps the creation time from the factory's
//! clock, fixes the expiration one hour later, applies the configured audience
//! and attaches the role's claims. Nothing here signs or performs I/O.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::claims::{ClaimKind, TokenClaims};
use crate::clock::{Clock, SystemClock};
use crate::error::{FleetAuthError, Result};
use crate::token::{DEFAULT_JWT_AUDIENCE, Token, TokenType};

/// Token factory configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFactorySettings {
    /// Audience (`aud`) of every token
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_audience() -> String {
    DEFAULT_JWT_AUDIENCE.to_string()
}

impl Default for TokenFactorySettings {
    fn default() -> Self {
        Self {
            audience: default_audience(),
        }
    }
}

/// Builds unsigned tokens for each role.
///
/// Operations taking claims check that the claims hold a single component of
/// the entity kind the role is scoped by, and nothing else.
pub trait TokenFactory: Send + Sync + Debug {
    /// Server token with wildcard trip and vehicle claims
    fn create_server_token(&self) -> Token;

    /// Driver token scoped by vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] unless `claims` are exactly one vehicle id.
    fn create_driver_token(&self, claims: TokenClaims) -> Result<Token>;

    /// Consumer token scoped by trip
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] unless `claims` are exactly one trip id.
    fn create_consumer_token(&self, claims: TokenClaims) -> Result<Token>;

    /// Delivery server token with wildcard delivery claims
    fn create_delivery_server_token(&self) -> Token;

    /// Delivery consumer token scoped by task or by tracking id
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] unless `claims` are exactly one task id
    /// or one tracking id.
    fn create_delivery_consumer_token(&self, claims: TokenClaims) -> Result<Token>;

    /// Untrusted delivery driver token scoped by delivery vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] unless `claims` are exactly one delivery
    /// vehicle id.
    fn create_untrusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token>;

    /// Trusted delivery driver token scoped by delivery vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] unless `claims` are exactly one delivery
    /// vehicle id.
    fn create_trusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token>;

    /// Trusted delivery driver token scoped by delivery vehicle and task
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::InvalidClaim`] when either claims value has the wrong
    /// kind or the two conflict.
    fn create_trusted_delivery_driver_task_token(
        &self,
        vehicle_claims: TokenClaims,
        task_claims: TokenClaims,
    ) -> Result<Token>;

    /// Delivery fleet reader token with wildcard delivery claims
    fn create_delivery_fleet_reader_token(&self) -> Token;

    /// Fleet reader token with wildcard claims over every kind
    fn create_fleet_reader_token(&self) -> Token;

    /// Token for a role outside the standard set
    ///
    /// # Errors
    ///
    /// The default factory accepts any claims; other factories may reject them.
    fn create_custom_token(&self, claims: TokenClaims) -> Result<Token>;
}

/// Factory stamping tokens from a [`Clock`]
#[derive(Debug, Clone)]
pub struct DefaultTokenFactory {
    clock: Arc<dyn Clock>,
    settings: TokenFactorySettings,
}

impl DefaultTokenFactory {
    /// Factory reading the system clock
    pub fn new(settings: TokenFactorySettings) -> Self {
        Self::with_clock(Arc::new(SystemClock), settings)
    }

    /// Factory reading `clock`
    pub fn with_clock(clock: Arc<dyn Clock>, settings: TokenFactorySettings) -> Self {
        Self { clock, settings }
    }

    /// Current settings
    pub fn settings(&self) -> &TokenFactorySettings {
        &self.settings
    }

    fn create(&self, token_type: TokenType, claims: TokenClaims) -> Token {
        Token::unsigned(
            token_type,
            claims,
            self.settings.audience.clone(),
            self.clock.now(),
        )
    }
}

impl Default for DefaultTokenFactory {
    fn default() -> Self {
        Self::new(TokenFactorySettings::default())
    }
}

/// Claims handed to a scoped role must hold exactly one component, and its
/// claim name must be one of `kinds`.
fn require(claims: &TokenClaims, token_type: TokenType, kinds: &[ClaimKind]) -> Result<()> {
    let allowed = |key: &str| kinds.iter().any(|kind| kind.claim_name() == key);

    if let Some(entry) = claims.entries().iter().find(|e| !allowed(e.key())) {
        return Err(FleetAuthError::invalid_claim(
            entry.key(),
            format!("{token_type} tokens cannot carry this claim"),
        ));
    }

    match claims.entries() {
        [_] => Ok(()),
        [] => {
            let expected = kinds
                .iter()
                .map(|k| k.claim_name())
                .collect::<Vec<_>>()
                .join(" or ");
            Err(FleetAuthError::invalid_claim(
                expected,
                format!("{token_type} tokens must be scoped by this claim"),
            ))
        }
        [first, ..] => Err(FleetAuthError::invalid_claim(
            first.key(),
            format!("{token_type} tokens are scoped by a single claim"),
        )),
    }
}

impl TokenFactory for DefaultTokenFactory {
    fn create_server_token(&self) -> Token {
        self.create(TokenType::Server, TokenClaims::server())
    }

    fn create_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        require(&claims, TokenType::Driver, &[ClaimKind::Vehicle])?;
        Ok(self.create(TokenType::Driver, claims))
    }

    fn create_consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        require(&claims, TokenType::Consumer, &[ClaimKind::Trip])?;
        Ok(self.create(TokenType::Consumer, claims))
    }

    fn create_delivery_server_token(&self) -> Token {
        self.create(TokenType::DeliveryServer, TokenClaims::delivery_server())
    }

    fn create_delivery_consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        require(
            &claims,
            TokenType::DeliveryConsumer,
            &[ClaimKind::Task, ClaimKind::Tracking],
        )?;
        Ok(self.create(TokenType::DeliveryConsumer, claims))
    }

    fn create_untrusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        require(
            &claims,
            TokenType::UntrustedDeliveryDriver,
            &[ClaimKind::DeliveryVehicle],
        )?;
        Ok(self.create(TokenType::UntrustedDeliveryDriver, claims))
    }

    fn create_trusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        require(
            &claims,
            TokenType::TrustedDeliveryDriver,
            &[ClaimKind::DeliveryVehicle],
        )?;
        Ok(self.create(TokenType::TrustedDeliveryDriver, claims))
    }

    fn create_trusted_delivery_driver_task_token(
        &self,
        vehicle_claims: TokenClaims,
        task_claims: TokenClaims,
    ) -> Result<Token> {
        require(
            &vehicle_claims,
            TokenType::TrustedDeliveryDriver,
            &[ClaimKind::DeliveryVehicle],
        )?;
        require(&task_claims, TokenType::TrustedDeliveryDriver, &[ClaimKind::Task])?;
        let merged = TokenClaims::merge([vehicle_claims, task_claims])?;
        Ok(self.create(TokenType::TrustedDeliveryDriver, merged))
    }

    fn create_delivery_fleet_reader_token(&self) -> Token {
        self.create(
            TokenType::DeliveryFleetReader,
            TokenClaims::delivery_fleet_reader(),
        )
    }

    fn create_fleet_reader_token(&self) -> Token {
        self.create(TokenType::FleetReader, TokenClaims::fleet_reader())
    }

    fn create_custom_token(&self, claims: TokenClaims) -> Result<Token> {
        Ok(self.create(TokenType::Custom, claims))
    }
}
