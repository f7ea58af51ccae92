//! Signing backends
//!
//! A [`Signer`] is bound to one identity and turns an unsigned [`Token`] into
//! a signed copy. Three backends ship with the crate:
//!
//! - [`LocalSigner`] signs in process with an RSA private key and stamps the
//!   caller's key id into the JWT header
//! - [`DefaultAccountSigner`] signs as the account the process runs as
//! - [`ImpersonatedSigner`] signs as another account on the caller's behalf
//!
//! The two cloud backends delegate the raw RSA operation to a [`BlobSigner`],
//! which is where credentials and transport live.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::token::Token;

mod blob;
mod local;

pub use blob::{BlobSigner, DefaultAccountSigner, ImpersonatedSigner};
pub use local::LocalSigner;

/// Produces signed tokens on behalf of one identity
#[async_trait]
pub trait Signer: Send + Sync + Debug {
    /// Identity written to `iss` and `sub`
    fn identity(&self) -> &str;

    /// Return a copy of `token` carrying a signed JWT.
    ///
    /// # Errors
    ///
    /// [`FleetAuthError::SigningFailure`](crate::FleetAuthError::SigningFailure)
    /// when the backend cannot produce a signature.
    async fn sign(&self, token: &Token) -> Result<Token>;
}
