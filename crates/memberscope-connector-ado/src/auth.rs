//! PAT authentication for the Azure DevOps REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;
use secrecy::ExposeSecret;

use crate::{AdoCredentials, AdoError, AdoResult};

/// Builds the `Authorization` header for a personal access token.
///
/// Azure DevOps expects Basic auth with an empty user name: `base64(":" + pat)`.
pub fn basic_auth_header(credentials: &AdoCredentials) -> AdoResult<HeaderValue> {
    if credentials.is_empty() {
        return Err(AdoError::Config("personal access token is empty".into()));
    }

    let encoded = STANDARD.encode(format!(":{}", credentials.pat.expose_secret()));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| AdoError::Config(format!("Invalid authorization header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}
