//! IAM Credentials `signBlob` client
//!
//! Signs bytes with a Google-managed key of a service account. The caller's
//! access token must belong to that account or to one allowed to create
//! tokens for it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use fleetauth::BlobSigner;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::error::{GcpError, GcpResult};
use crate::token_source::AccessTokenSource;

/// Production IAM Credentials endpoint
pub const IAM_CREDENTIALS_ENDPOINT: &str = "https://iamcredentials.googleapis.com/";

#[derive(Serialize)]
struct SignBlobRequest {
    payload: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponse {
    key_id: String,
    signed_blob: String,
}

/// Signature returned by `signBlob`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBlob {
    /// Id of the service account key that signed
    pub key_id: String,
    /// Raw RSA-SHA256 signature
    pub signature: Vec<u8>,
}

/// Client for `projects/-/serviceAccounts/*:signBlob`
#[derive(Debug, Clone)]
pub struct IamCredentialsClient {
    base_url: Url,
    http_client: reqwest::Client,
    tokens: Arc<dyn AccessTokenSource>,
}

impl IamCredentialsClient {
    /// Client for the production endpoint.
    ///
    /// # Errors
    ///
    /// [`GcpError::Http`] when the HTTP client cannot be built.
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> GcpResult<Self> {
        Self::with_base_url(Url::parse(IAM_CREDENTIALS_ENDPOINT)?, tokens)
    }

    /// Client for an explicit endpoint.
    ///
    /// # Errors
    ///
    /// [`GcpError::Http`] when the HTTP client cannot be built.
    pub fn with_base_url(base_url: Url, tokens: Arc<dyn AccessTokenSource>) -> GcpResult<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url,
            http_client,
            tokens,
        })
    }

    /// Sign `blob` with a key of `account`.
    ///
    /// # Errors
    ///
    /// [`GcpError`] on transport failure, non-success status or a response
    /// that does not carry a base64 signature.
    pub async fn sign(&self, account: &str, blob: &[u8]) -> GcpResult<SignedBlob> {
        let url = self
            .base_url
            .join(&format!("v1/projects/-/serviceAccounts/{account}:signBlob"))?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&SignBlobRequest {
                payload: STANDARD.encode(blob),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(account = %account, status = %status, "signBlob rejected request");
            return Err(GcpError::Status {
                endpoint: "signBlob".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: SignBlobResponse =
            response.json().await.map_err(|e| GcpError::InvalidResponse {
                endpoint: "signBlob".to_string(),
                reason: e.to_string(),
            })?;
        let signature = STANDARD
            .decode(&body.signed_blob)
            .map_err(|e| GcpError::InvalidResponse {
                endpoint: "signBlob".to_string(),
                reason: format!("signedBlob is not base64: {e}"),
            })?;

        debug!(account = %account, key_id = %body.key_id, "Blob signed by IAM");
        Ok(SignedBlob {
            key_id: body.key_id,
            signature,
        })
    }
}

#[async_trait]
impl BlobSigner for IamCredentialsClient {
    async fn sign_blob(&self, account: &str, blob: &[u8]) -> fleetauth::Result<Vec<u8>> {
        self.sign(account, blob)
            .await
            .map(|signed| signed.signature)
            .map_err(|e| e.into_signing_failure(account))
    }
}
