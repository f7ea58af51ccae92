//! Wildcard token cache
//!
//! Role-wide tokens (every claim a wildcard) are expensive to re-sign on every
//! outbound call, so [`CachingStateManager`] keeps the last signed one per
//! [`TokenType`] and serves it until it comes within [`EXPIRATION_WINDOW`] of
//! expiring. Scoped tokens bypass the cache entirely.
//!
//! Refreshes run under a single async mutex with a second cache check inside
//! it, so callers queued behind a refresh pick up the winner's token instead
//! of signing again.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::expiry::TokenExpiryValidator;
use crate::signer::Signer;
use crate::token::{Token, TokenType};

/// Remaining lifetime below which a cached token is refreshed
pub const EXPIRATION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Turns unsigned tokens into signed ones, possibly reusing earlier work
#[async_trait]
pub trait TokenStateManager: Send + Sync + Debug {
    /// Sign `token` with `signer`, or return an equivalent signed token that
    /// is still valid.
    ///
    /// # Errors
    ///
    /// Propagates the signer's failure unchanged.
    async fn sign_token(&self, signer: &dyn Signer, token: Token) -> Result<Token>;
}

/// State manager caching wildcard tokens per token type
#[derive(Debug)]
pub struct CachingStateManager {
    cache: DashMap<TokenType, Token>,
    refresh: Mutex<()>,
    validator: TokenExpiryValidator,
}

impl CachingStateManager {
    /// Manager judging expiry by the system clock
    pub fn new() -> Self {
        Self::with_validator(TokenExpiryValidator::default())
    }

    /// Manager judging expiry by `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_validator(TokenExpiryValidator::new(clock))
    }

    /// Manager using a prepared validator
    pub fn with_validator(validator: TokenExpiryValidator) -> Self {
        Self {
            cache: DashMap::new(),
            refresh: Mutex::new(()),
            validator,
        }
    }

    /// Number of token types currently cached
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached token
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// A cached token usable in place of `wanted`: same scope, same audience
    /// and not expiring within the window.
    fn reusable(&self, wanted: &Token) -> Option<Token> {
        let cached = self
            .cache
            .get(&wanted.token_type())
            .map(|entry| entry.value().clone())?;

        if cached.claims() != wanted.claims() || cached.audience() != wanted.audience() {
            return None;
        }
        if self.validator.is_token_expired(&cached, EXPIRATION_WINDOW) {
            return None;
        }
        Some(cached)
    }
}

impl Default for CachingStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStateManager for CachingStateManager {
    async fn sign_token(&self, signer: &dyn Signer, token: Token) -> Result<Token> {
        let token_type = token.token_type();

        if !token.claims().is_wildcard() {
            return signer.sign(&token).await;
        }

        if let Some(cached) = self.reusable(&token) {
            debug!(token_type = %token_type, "Serving cached token");
            return Ok(cached);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(cached) = self.reusable(&token) {
            debug!(token_type = %token_type, "Serving token refreshed by concurrent caller");
            return Ok(cached);
        }

        let signed = signer.sign(&token).await?;
        self.cache.insert(token_type, signed.clone());
        info!(
            token_type = %token_type,
            identity = %signer.identity(),
            expires_at = signed.expires_at_secs(),
            "Refreshed cached token"
        );
        Ok(signed)
    }
}
