//! Per-role minting facade
//!
//! [`AuthTokenMinter`] pairs each role with its configured [`Signer`]. Every
//! operation follows the same path: refuse early when the role has no signer,
//! build the unsigned token, then hand it to the state manager.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::claims::TokenClaims;
use crate::error::{FleetAuthError, Result};
use crate::factory::{DefaultTokenFactory, TokenFactory};
use crate::signer::Signer;
use crate::state::{CachingStateManager, TokenStateManager};
use crate::token::{Token, TokenType};

/// Role family whose server token backs [`TokenProvider::signed_token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultRole {
    /// On-demand rides and deliveries: the server role
    #[default]
    Odrd,
    /// Last-mile fleet solution: the delivery server role
    Lmfs,
}

impl DefaultRole {
    /// Token type served by default for this family
    pub const fn token_type(self) -> TokenType {
        match self {
            Self::Odrd => TokenType::Server,
            Self::Lmfs => TokenType::DeliveryServer,
        }
    }
}

/// Everything a minter needs. Fields are public; unset signers disable the
/// matching operations.
#[derive(Debug, Clone)]
pub struct MinterConfig {
    pub server_signer: Option<Arc<dyn Signer>>,
    pub driver_signer: Option<Arc<dyn Signer>>,
    pub consumer_signer: Option<Arc<dyn Signer>>,
    pub delivery_server_signer: Option<Arc<dyn Signer>>,
    pub delivery_consumer_signer: Option<Arc<dyn Signer>>,
    pub untrusted_delivery_driver_signer: Option<Arc<dyn Signer>>,
    pub trusted_delivery_driver_signer: Option<Arc<dyn Signer>>,
    pub delivery_fleet_reader_signer: Option<Arc<dyn Signer>>,
    pub fleet_reader_signer: Option<Arc<dyn Signer>>,
    pub custom_signer: Option<Arc<dyn Signer>>,
    pub token_factory: Arc<dyn TokenFactory>,
    pub state_manager: Arc<dyn TokenStateManager>,
    pub default_role: DefaultRole,
}

impl MinterConfig {
    /// Empty configuration with the default factory and a fresh cache
    pub fn new(default_role: DefaultRole) -> Self {
        Self {
            server_signer: None,
            driver_signer: None,
            consumer_signer: None,
            delivery_server_signer: None,
            delivery_consumer_signer: None,
            untrusted_delivery_driver_signer: None,
            trusted_delivery_driver_signer: None,
            delivery_fleet_reader_signer: None,
            fleet_reader_signer: None,
            custom_signer: None,
            token_factory: Arc::new(DefaultTokenFactory::default()),
            state_manager: Arc::new(CachingStateManager::new()),
            default_role,
        }
    }

    /// On-demand rides configuration; requires a server signer
    pub fn odrd() -> Self {
        Self::new(DefaultRole::Odrd)
    }

    /// Last-mile fleet configuration; requires a delivery server signer
    pub fn lmfs() -> Self {
        Self::new(DefaultRole::Lmfs)
    }

    /// Signer configured for `token_type`
    pub fn signer(&self, token_type: TokenType) -> Option<&Arc<dyn Signer>> {
        match token_type {
            TokenType::Server => self.server_signer.as_ref(),
            TokenType::Driver => self.driver_signer.as_ref(),
            TokenType::Consumer => self.consumer_signer.as_ref(),
            TokenType::DeliveryServer => self.delivery_server_signer.as_ref(),
            TokenType::DeliveryConsumer => self.delivery_consumer_signer.as_ref(),
            TokenType::UntrustedDeliveryDriver => self.untrusted_delivery_driver_signer.as_ref(),
            TokenType::TrustedDeliveryDriver => self.trusted_delivery_driver_signer.as_ref(),
            TokenType::DeliveryFleetReader => self.delivery_fleet_reader_signer.as_ref(),
            TokenType::FleetReader => self.fleet_reader_signer.as_ref(),
            TokenType::Custom => self.custom_signer.as_ref(),
        }
    }

    /// Replace the signer for `token_type`
    pub fn set_signer(&mut self, token_type: TokenType, signer: Option<Arc<dyn Signer>>) {
        let slot = match token_type {
            TokenType::Server => &mut self.server_signer,
            TokenType::Driver => &mut self.driver_signer,
            TokenType::Consumer => &mut self.consumer_signer,
            TokenType::DeliveryServer => &mut self.delivery_server_signer,
            TokenType::DeliveryConsumer => &mut self.delivery_consumer_signer,
            TokenType::UntrustedDeliveryDriver => &mut self.untrusted_delivery_driver_signer,
            TokenType::TrustedDeliveryDriver => &mut self.trusted_delivery_driver_signer,
            TokenType::DeliveryFleetReader => &mut self.delivery_fleet_reader_signer,
            TokenType::FleetReader => &mut self.fleet_reader_signer,
            TokenType::Custom => &mut self.custom_signer,
        };
        *slot = signer;
    }
}

/// Source of the bearer token attached to outbound calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Signed token for the default role.
    ///
    /// # Errors
    ///
    /// Same as the underlying role operation.
    async fn signed_token(&self) -> Result<Token>;
}

/// Mints signed tokens for every role
#[derive(Debug, Clone)]
pub struct AuthTokenMinter {
    config: MinterConfig,
}

impl AuthTokenMinter {
    /// Validate `config` and build a minter.
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`] when the signer required by
    /// the default role is missing.
    pub fn new(config: MinterConfig) -> Result<Self> {
        let required = config.default_role.token_type();
        if config.signer(required).is_none() {
            return Err(FleetAuthError::SignerNotConfigured(required));
        }
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    /// Role family served by [`TokenProvider::signed_token`]
    pub fn default_role(&self) -> DefaultRole {
        self.config.default_role
    }

    /// Whether a signer is configured for `token_type`
    pub fn supports(&self, token_type: TokenType) -> bool {
        self.config.signer(token_type).is_some()
    }

    async fn mint<F>(&self, token_type: TokenType, build: F) -> Result<Token>
    where
        F: FnOnce(&dyn TokenFactory) -> Result<Token> + Send,
    {
        let Some(signer) = self.config.signer(token_type) else {
            warn!(token_type = %token_type, "Token requested for role without signer");
            return Err(FleetAuthError::SignerNotConfigured(token_type));
        };

        let token = build(self.config.token_factory.as_ref())?;
        debug!(
            token_type = %token_type,
            wildcard = token.claims().is_wildcard(),
            "Built unsigned token"
        );
        self.config
            .state_manager
            .sign_token(signer.as_ref(), token)
            .await
    }

    /// Server token over every trip and vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`] or the signer's failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn server_token(&self) -> Result<Token> {
        self.mint(TokenType::Server, |f| Ok(f.create_server_token())).await
    }

    /// Driver token scoped by vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn driver_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::Driver, |f| f.create_driver_token(claims)).await
    }

    /// Consumer token scoped by trip
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::Consumer, |f| f.create_consumer_token(claims)).await
    }

    /// Delivery server token over every task, tracking id and delivery vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`] or the signer's failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn delivery_server_token(&self) -> Result<Token> {
        self.mint(TokenType::DeliveryServer, |f| {
            Ok(f.create_delivery_server_token())
        })
        .await
    }

    /// Delivery consumer token scoped by task or tracking id
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn delivery_consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::DeliveryConsumer, |f| {
            f.create_delivery_consumer_token(claims)
        })
        .await
    }

    /// Untrusted delivery driver token scoped by delivery vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn untrusted_delivery_vehicle_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::UntrustedDeliveryDriver, |f| {
            f.create_untrusted_delivery_driver_token(claims)
        })
        .await
    }

    /// Trusted delivery driver token scoped by delivery vehicle
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn trusted_delivery_vehicle_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::TrustedDeliveryDriver, |f| {
            f.create_trusted_delivery_driver_token(claims)
        })
        .await
    }

    /// Trusted delivery driver token scoped by delivery vehicle and task
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn trusted_delivery_vehicle_task_token(
        &self,
        vehicle_claims: TokenClaims,
        task_claims: TokenClaims,
    ) -> Result<Token> {
        self.mint(TokenType::TrustedDeliveryDriver, |f| {
            f.create_trusted_delivery_driver_task_token(vehicle_claims, task_claims)
        })
        .await
    }

    /// Read-only token over the whole delivery fleet
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`] or the signer's failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn delivery_fleet_reader_token(&self) -> Result<Token> {
        self.mint(TokenType::DeliveryFleetReader, |f| {
            Ok(f.create_delivery_fleet_reader_token())
        })
        .await
    }

    /// Read-only token over every entity kind
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`] or the signer's failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn fleet_reader_token(&self) -> Result<Token> {
        self.mint(TokenType::FleetReader, |f| Ok(f.create_fleet_reader_token())).await
    }

    /// Token for caller-defined claims, signed by the custom signer
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SignerNotConfigured`], [`FleetAuthError::InvalidClaim`]
    /// or the signer's failure.
    #[instrument(level = "debug", skip_all)]
    pub async fn custom_token(&self, claims: TokenClaims) -> Result<Token> {
        self.mint(TokenType::Custom, |f| f.create_custom_token(claims)).await
    }
}

#[async_trait]
impl TokenProvider for AuthTokenMinter {
    async fn signed_token(&self) -> Result<Token> {
        match self.config.default_role {
            DefaultRole::Odrd => self.server_token().await,
            DefaultRole::Lmfs => self.delivery_server_token().await,
        }
    }
}
