//! JWT wire format
//!
//! Every minted token carries the same payload shape regardless of backend:
//!
//! ```text
//! header:  { "alg": "RS256", "typ": "JWT", "kid": <local signing only> }
//! payload: { "iss": identity, "sub": identity, "aud": audience,
//!            "iat": seconds, "exp": seconds,
//!            "authorization": { "<claim name>": "<id or *>", ... } }
//! ```
//!
//! Cloud-identity signers omit `kid`; the relying party resolves the key from
//! the issuer.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{FleetAuthError, Result};
use crate::token::Token;

/// Name of the custom claim holding the authorization map
pub const AUTHORIZATION_CLAIM: &str = "authorization";

/// Signing algorithm used by every backend
pub const ALGORITHM: &str = "RS256";

/// JOSE header of a minted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signing algorithm
    pub alg: String,
    /// Token type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Key id, only present for local-key signing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    /// RS256 header without a key id
    pub fn rs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
            kid: None,
        }
    }
}

/// Claims set of a minted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPayload {
    /// Issuer: the signing identity
    pub iss: String,
    /// Subject: the signing identity
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Issued at, seconds since the Unix epoch
    pub iat: u64,
    /// Expiration, seconds since the Unix epoch
    pub exp: u64,
    /// Authorization scope
    #[serde(rename = "authorization", default)]
    pub authorization: BTreeMap<String, String>,
}

impl JwtPayload {
    /// Payload for `token` signed as `identity`
    pub fn for_token(identity: &str, token: &Token) -> Self {
        Self {
            iss: identity.to_string(),
            sub: identity.to_string(),
            aud: token.audience().to_string(),
            iat: token.issued_at_secs(),
            exp: token.expires_at_secs(),
            authorization: token.claims().to_map(),
        }
    }
}

/// `base64url(header) "." base64url(payload)`, the bytes a backend signs
pub(crate) fn signing_input(
    header: &JwtHeader,
    payload: &JwtPayload,
) -> serde_json::Result<String> {
    let header = serde_json::to_vec(header)?;
    let payload = serde_json::to_vec(payload)?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    ))
}

/// Complete a JWT from its signing input and raw signature
pub(crate) fn append_signature(mut signing_input: String, signature: &[u8]) -> String {
    signing_input.push('.');
    signing_input.push_str(&URL_SAFE_NO_PAD.encode(signature));
    signing_input
}

/// Split a JWT into header and payload **without** checking the signature.
///
/// For inspection and tests only; this crate never validates tokens.
///
/// # Errors
///
/// Returns [`FleetAuthError::MalformedJwt`] unless `jwt` has three segments
/// whose first two are base64url-encoded JSON of the expected shape.
pub fn decode_unverified(jwt: &str) -> Result<(JwtHeader, JwtPayload)> {
    let mut segments = jwt.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(FleetAuthError::MalformedJwt(
            "expected three dot-separated segments".to_string(),
        ));
    };

    Ok((decode_segment(header, "header")?, decode_segment(payload, "payload")?))
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str, what: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| FleetAuthError::MalformedJwt(format!("{what} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FleetAuthError::MalformedJwt(format!("{what} is not valid JSON: {e}")))
}
