//! Compute metadata server: ambient account and access token
//!
//! Reachable only from inside Google Cloud (or an emulator pointed to by
//! [`METADATA_HOST_ENV`]). Every request carries `Metadata-Flavor: Google`.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{GcpError, GcpResult};
use crate::token_source::AccessTokenSource;

/// Environment variable overriding the metadata host
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const EMAIL_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/email";
const TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before the server says they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedAccessToken {
    token: String,
    refresh_at: Instant,
}

impl fmt::Debug for CachedAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedAccessToken")
            .field("refresh_at", &self.refresh_at)
            .finish_non_exhaustive()
    }
}

/// Client for the metadata server of the current machine
#[derive(Debug)]
pub struct MetadataServer {
    base_url: Url,
    http_client: reqwest::Client,
    cached: RwLock<Option<CachedAccessToken>>,
}

impl MetadataServer {
    /// Client for the default host, or the one named by [`METADATA_HOST_ENV`].
    ///
    /// # Errors
    ///
    /// [`GcpError`] when the host override is not a valid host or the HTTP
    /// client cannot be built.
    pub fn from_environment() -> GcpResult<Self> {
        let host = std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());
        Self::with_base_url(Url::parse(&format!("http://{host}/"))?)
    }

    /// Client for an explicit base URL, such as a local emulator.
    ///
    /// # Errors
    ///
    /// [`GcpError::Http`] when the HTTP client cannot be built.
    pub fn with_base_url(base_url: Url) -> GcpResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            base_url,
            http_client,
            cached: RwLock::new(None),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Email of the service account this machine runs as.
    ///
    /// # Errors
    ///
    /// [`GcpError`] when the server is unreachable or reports no account.
    pub async fn email(&self) -> GcpResult<String> {
        let email = self.get(EMAIL_PATH).await?.text().await?;
        let email = email.trim();
        if email.is_empty() {
            return Err(GcpError::InvalidResponse {
                endpoint: EMAIL_PATH.to_string(),
                reason: "empty service account email".to_string(),
            });
        }
        debug!(account = %email, "Resolved ambient service account");
        Ok(email.to_string())
    }

    async fn get(&self, path: &str) -> GcpResult<reqwest::Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .http_client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                error!(path = %path, error = %e, "Metadata server unreachable");
                GcpError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(path = %path, status = %status, "Metadata server returned error status");
            return Err(GcpError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn fetch_token(&self) -> GcpResult<CachedAccessToken> {
        let response: TokenResponse = self.get(TOKEN_PATH).await?.json().await.map_err(|e| {
            GcpError::InvalidResponse {
                endpoint: TOKEN_PATH.to_string(),
                reason: e.to_string(),
            }
        })?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(REFRESH_MARGIN);
        info!(expires_in = response.expires_in, "Fetched access token from metadata server");
        Ok(CachedAccessToken {
            token: response.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl AccessTokenSource for MetadataServer {
    async fn access_token(&self) -> GcpResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(cached) = cached.as_ref()
                && Instant::now() < cached.refresh_at
            {
                return Ok(cached.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(current) = cached.as_ref()
            && Instant::now() < current.refresh_at
        {
            return Ok(current.token.clone());
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
