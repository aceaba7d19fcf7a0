//! Azure DevOps Graph REST client with continuation tokens and retry handling.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::basic_auth_header;
use crate::rate_limit::{is_retryable, RetryPolicy};
use crate::{AdoConfig, AdoCredentials, AdoError, AdoResult};

/// Response header carrying the listing continuation token.
pub const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

/// Error body returned by Azure DevOps REST endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub message: String,
}

/// List envelope used by Graph collection endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Decoded body plus the continuation token, if the server sent one.
#[derive(Debug)]
pub struct GraphResponse<T> {
    pub body: T,
    pub continuation_token: Option<String>,
}

/// Azure DevOps Graph API client.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    auth_header: HeaderValue,
    base_url: String,
    api_version: String,
    retry: RetryPolicy,
}

impl GraphClient {
    /// Creates a new Graph client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the PAT is empty, or
    /// the HTTP client cannot be created.
    pub fn new(config: &AdoConfig, credentials: &AdoCredentials) -> AdoResult<Self> {
        config.validate()?;
        let auth_header = basic_auth_header(credentials)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdoError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            auth_header,
            base_url: config.graph_base_url(),
            api_version: config.api_version.clone(),
            retry: RetryPolicy::new(config.retry.clone()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base}/{path}?api-version=...` plus extra query pairs.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> AdoResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api-version", &self.api_version);
        }
        Ok(url)
    }

    /// Performs a GET request with retry handling.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> AdoResult<GraphResponse<T>> {
        let mut attempt = 0u32;

        loop {
            let response = self
                .http_client
                .get(url.clone())
                .header(AUTHORIZATION, self.auth_header.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();

            if is_retryable(status) {
                if !self.retry.can_retry(attempt) {
                    warn!(status = %status, attempts = attempt, "Giving up after retries");
                    return Err(AdoError::MaxRetriesExceeded {
                        attempts: attempt,
                        status: status.as_u16(),
                    });
                }
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                self.retry
                    .wait(status, retry_after.as_deref(), attempt)
                    .await;
                attempt += 1;
                continue;
            }

            // An invalid PAT is answered with 203 and the sign-in page
            if matches!(
                status,
                StatusCode::UNAUTHORIZED
                    | StatusCode::FORBIDDEN
                    | StatusCode::NON_AUTHORITATIVE_INFORMATION
            ) {
                return Err(AdoError::Auth {
                    status: status.as_u16(),
                });
            }

            if status.is_success() {
                let continuation_token = response
                    .headers()
                    .get(CONTINUATION_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned);
                let bytes = response.bytes().await?;
                let body = serde_json::from_slice(&bytes)?;
                debug!(continuation = continuation_token.is_some(), "GET succeeded");
                return Ok(GraphResponse {
                    body,
                    continuation_token,
                });
            }

            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_body)
                .map(|e| e.message)
                .unwrap_or(error_body);
            return Err(AdoError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }
}
