//! # Fleetauth GCP - Cloud Signing Backends
//!
//! Concrete collaborators for the blob-signing signers in [`fleetauth`]:
//!
//! - [`IamCredentialsClient`] calls the IAM Credentials `signBlob` method and
//!   implements [`fleetauth::BlobSigner`]
//! - [`MetadataServer`] resolves the ambient service account and its OAuth
//!   access token from the compute metadata server
//! - [`StaticTokenSource`] supplies a fixed access token, for tests and for
//!   callers that manage credentials themselves
//!
//! [`GcpSigners`] wires them together for the common case.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fleetauth::{AuthTokenMinter, MinterConfig};
//! use fleetauth_gcp::GcpSigners;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gcp = GcpSigners::from_environment()?;
//!
//! let mut config = MinterConfig::odrd();
//! config.server_signer = Some(Arc::new(gcp.default_account().await?));
//! config.driver_signer = Some(Arc::new(
//!     gcp.impersonated("fleet-driver@my-project.iam.gserviceaccount.com"),
//! ));
//! let minter = AuthTokenMinter::new(config)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod iam;
pub mod metadata;
pub mod token_source;

use std::sync::Arc;

use fleetauth::{DefaultAccountSigner, ImpersonatedSigner};

pub use error::{GcpError, GcpResult};
pub use iam::{IAM_CREDENTIALS_ENDPOINT, IamCredentialsClient, SignedBlob};
pub use metadata::{METADATA_HOST_ENV, MetadataServer};
pub use token_source::{AccessTokenSource, StaticTokenSource};

/// Builds cloud signers sharing one metadata server and IAM client
#[derive(Debug, Clone)]
pub struct GcpSigners {
    metadata: Arc<MetadataServer>,
    iam: Arc<IamCredentialsClient>,
}

impl GcpSigners {
    /// Signers authenticated with the ambient identity of this machine.
    ///
    /// # Errors
    ///
    /// [`GcpError`] when the HTTP clients cannot be built or the metadata
    /// host override is not a valid URL.
    pub fn from_environment() -> GcpResult<Self> {
        let metadata = Arc::new(MetadataServer::from_environment()?);
        let iam = Arc::new(IamCredentialsClient::new(metadata.clone())?);
        Ok(Self::new(metadata, iam))
    }

    /// Signers over explicit collaborators
    pub fn new(metadata: Arc<MetadataServer>, iam: Arc<IamCredentialsClient>) -> Self {
        Self { metadata, iam }
    }

    /// Signer for the account this process runs as.
    ///
    /// # Errors
    ///
    /// [`GcpError`] when the metadata server does not report an account.
    pub async fn default_account(&self) -> GcpResult<DefaultAccountSigner> {
        let account = self.metadata.email().await?;
        Ok(DefaultAccountSigner::new(account, self.iam.clone()))
    }

    /// Signer impersonating `target`
    pub fn impersonated(&self, target: impl Into<String>) -> ImpersonatedSigner {
        ImpersonatedSigner::new(target, self.iam.clone())
    }
}
