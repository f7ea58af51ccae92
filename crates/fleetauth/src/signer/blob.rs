//! Signing through a remote blob-signing service
//!
//! The JWT is assembled here and only the `header.payload` bytes travel to the
//! [`BlobSigner`]. Cloud identities publish their keys by account, so no `kid`
//! is written.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::Signer;
use crate::error::{FleetAuthError, Result};
use crate::jwt::{JwtHeader, JwtPayload, append_signature, signing_input};
use crate::token::Token;

/// Raw RSA-SHA256 signing on behalf of a named account
#[async_trait]
pub trait BlobSigner: Send + Sync + Debug {
    /// Sign `blob` as `account` and return the signature bytes.
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SigningFailure`] when the service refuses or cannot
    /// be reached.
    async fn sign_blob(&self, account: &str, blob: &[u8]) -> Result<Vec<u8>>;
}

async fn sign_as(blob_signer: &dyn BlobSigner, account: &str, token: &Token) -> Result<Token> {
    let input = signing_input(&JwtHeader::rs256(), &JwtPayload::for_token(account, token))
        .map_err(|e| FleetAuthError::signing(account, e))?;

    let signature = match blob_signer.sign_blob(account, input.as_bytes()).await {
        Ok(signature) => signature,
        Err(e) => {
            warn!(
                account = %account,
                token_type = %token.token_type(),
                error = %e,
                "Blob signing failed"
            );
            return Err(e);
        }
    };

    Ok(token.with_jwt(append_signature(input, &signature)))
}

/// Signs as the account the process itself runs as.
///
/// That account needs permission to sign blobs for itself.
#[derive(Debug, Clone)]
pub struct DefaultAccountSigner {
    account: String,
    blob_signer: Arc<dyn BlobSigner>,
}

impl DefaultAccountSigner {
    /// Signer for the ambient `account`
    pub fn new(account: impl Into<String>, blob_signer: Arc<dyn BlobSigner>) -> Self {
        Self {
            account: account.into(),
            blob_signer,
        }
    }
}

#[async_trait]
impl Signer for DefaultAccountSigner {
    fn identity(&self) -> &str {
        &self.account
    }

    async fn sign(&self, token: &Token) -> Result<Token> {
        let signed = sign_as(self.blob_signer.as_ref(), &self.account, token).await?;
        debug!(
            account = %self.account,
            token_type = %token.token_type(),
            "Signed token as default account"
        );
        Ok(signed)
    }
}

/// Signs as `target`, using the caller's credentials to impersonate it.
///
/// The caller needs token-creator rights on the target account.
#[derive(Debug, Clone)]
pub struct ImpersonatedSigner {
    target: String,
    blob_signer: Arc<dyn BlobSigner>,
}

impl ImpersonatedSigner {
    /// Signer impersonating `target`
    pub fn new(target: impl Into<String>, blob_signer: Arc<dyn BlobSigner>) -> Self {
        Self {
            target: target.into(),
            blob_signer,
        }
    }
}

#[async_trait]
impl Signer for ImpersonatedSigner {
    fn identity(&self) -> &str {
        &self.target
    }

    async fn sign(&self, token: &Token) -> Result<Token> {
        let signed = sign_as(self.blob_signer.as_ref(), &self.target, token).await?;
        debug!(
            target_account = %self.target,
            token_type = %token.token_type(),
            "Signed token by impersonation"
        );
        Ok(signed)
    }
}
