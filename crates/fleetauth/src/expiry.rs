//! Expiration window checks

use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::token::Token;

/// Decides whether a token is about to expire
#[derive(Debug, Clone)]
pub struct TokenExpiryValidator {
    clock: Arc<dyn Clock>,
}

impl TokenExpiryValidator {
    /// Validator reading the given clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// True when `token` expires within `window` of now, that is when
    /// `expires_at - window` is strictly before the current time.
    pub fn is_token_expired(&self, token: &Token, window: Duration) -> bool {
        match token.expires_at().checked_sub(window) {
            Some(deadline) => deadline < self.clock.now(),
            None => true,
        }
    }
}

impl Default for TokenExpiryValidator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
