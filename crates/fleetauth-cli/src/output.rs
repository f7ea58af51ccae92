//! Rendering tokens for the terminal

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use fleetauth::{JwtHeader, JwtPayload, Token, decode_unverified};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

#[derive(Serialize)]
struct DecodedView<'a> {
    header: &'a JwtHeader,
    payload: &'a JwtPayload,
}

#[derive(Serialize)]
struct TokenView<'a> {
    token_type: &'a str,
    audience: &'a str,
    issued_at: String,
    expires_at: String,
    jwt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded: Option<DecodedView<'a>>,
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a signed token, optionally with its decoded contents.
///
/// # Errors
///
/// [`CliError::InvalidArguments`] for an unsigned token, or a decoding or
/// serialization failure.
pub fn render_token(token: &Token, format: OutputFormat, decode: bool) -> CliResult<String> {
    let Some(jwt) = token.jwt() else {
        return Err(CliError::InvalidArguments("token is not signed".to_string()));
    };
    let decoded = if decode {
        Some(decode_unverified(jwt)?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let view = TokenView {
                token_type: token.token_type().as_str(),
                audience: token.audience(),
                issued_at: timestamp(token.created_at()),
                expires_at: timestamp(token.expires_at()),
                jwt,
                decoded: decoded.as_ref().map(|(header, payload)| DecodedView { header, payload }),
            };
            Ok(serde_json::to_string_pretty(&view)?)
        }
        OutputFormat::Human => {
            let mut out = format!(
                "Token type: {}\nAudience:   {}\nIssued at:  {}\nExpires at: {}\n\n{jwt}\n",
                token.token_type(),
                token.audience(),
                timestamp(token.created_at()),
                timestamp(token.expires_at()),
            );
            if let Some((header, payload)) = &decoded {
                out.push('\n');
                out.push_str(&render_parts(header, payload)?);
            }
            Ok(out)
        }
    }
}

/// Render the header and payload of an arbitrary JWT.
///
/// # Errors
///
/// [`fleetauth::FleetAuthError::MalformedJwt`] when `jwt` cannot be decoded.
pub fn render_decoded(jwt: &str, format: OutputFormat) -> CliResult<String> {
    let (header, payload) = decode_unverified(jwt)?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&DecodedView {
            header: &header,
            payload: &payload,
        })?),
        OutputFormat::Human => render_parts(&header, &payload),
    }
}

fn render_parts(header: &JwtHeader, payload: &JwtPayload) -> CliResult<String> {
    Ok(format!(
        "Header:\n{}\nPayload:\n{}\n",
        serde_json::to_string_pretty(header)?,
        serde_json::to_string_pretty(payload)?,
    ))
}
