//! OAuth access tokens for calling Google APIs

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::GcpResult;

/// Supplies bearer tokens for Google API calls
#[async_trait]
pub trait AccessTokenSource: Send + Sync + Debug {
    /// A currently valid access token.
    ///
    /// # Errors
    ///
    /// [`GcpError`](crate::GcpError) when no token can be obtained.
    async fn access_token(&self) -> GcpResult<String>;
}

/// Always returns the same token
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Source handing out `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> GcpResult<String> {
        Ok(self.token.clone())
    }
}
