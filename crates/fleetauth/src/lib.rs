//! # Fleetauth - Role-Scoped Token Minting
//!
//! Mints short-lived RS256 JWTs for fleet-management backends. Each token is
//! bound to a role (server, driver, consumer, delivery roles, fleet readers)
//! and to an authorization scope: either a wildcard over an entity kind or a
//! single entity id.
//!
//! ## Architecture
//!
//! ```text
//! caller ─▶ AuthTokenMinter ─▶ TokenFactory ──▶ unsigned Token
//!                 │                                   │
//!                 └──────▶ TokenStateManager ◀────────┘
//!                               │   (wildcard? cached : sign)
//!                               ▼
//!                          dyn Signer ─▶ signed Token
//! ```
//!
//! - [`claims`] - Authorization scope values and their smart constructors
//! - [`token`] - The immutable [`Token`] value and [`TokenType`] tags
//! - [`factory`] - Builds unsigned tokens stamped by an injectable [`Clock`]
//! - [`signer`] - The [`Signer`] capability and its backends
//! - [`expiry`] - Expiration window checks
//! - [`state`] - Wildcard token cache
//! - [`minter`] - The per-role facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fleetauth::{AuthTokenMinter, LocalSigner, MinterConfig, TokenClaims};
//!
//! # async fn run(pem: &str) -> fleetauth::Result<()> {
//! let server = LocalSigner::new("server@project.iam.gserviceaccount.com", "key-1", pem)?;
//! let driver = LocalSigner::new("driver@project.iam.gserviceaccount.com", "key-2", pem)?;
//!
//! let mut config = MinterConfig::odrd();
//! config.server_signer = Some(Arc::new(server));
//! config.driver_signer = Some(Arc::new(driver));
//! let minter = AuthTokenMinter::new(config)?;
//!
//! let server_token = minter.server_token().await?;
//! let driver_token = minter.driver_token(TokenClaims::vehicle("vehicle-123")?).await?;
//! println!("{}", driver_token.authorization_header().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Caching
//!
//! Tokens whose claims are entirely wildcard are cached per [`TokenType`] and
//! reused until they come within [`EXPIRATION_WINDOW`] of expiring. Scoped
//! tokens are signed on every call.

pub mod claims;
pub mod clock;
pub mod error;
pub mod expiry;
pub mod factory;
pub mod jwt;
pub mod minter;
pub mod signer;
pub mod state;
pub mod token;

pub use claims::{ClaimEntry, ClaimKind, TokenClaims, WILDCARD};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FleetAuthError, Result};
pub use expiry::TokenExpiryValidator;
pub use factory::{DefaultTokenFactory, TokenFactory, TokenFactorySettings};
pub use jwt::{AUTHORIZATION_CLAIM, JwtHeader, JwtPayload, decode_unverified};
pub use minter::{AuthTokenMinter, DefaultRole, MinterConfig, TokenProvider};
pub use signer::{BlobSigner, DefaultAccountSigner, ImpersonatedSigner, LocalSigner, Signer};
pub use state::{CachingStateManager, EXPIRATION_WINDOW, TokenStateManager};
pub use token::{DEFAULT_JWT_AUDIENCE, TOKEN_LIFETIME, Token, TokenType};
