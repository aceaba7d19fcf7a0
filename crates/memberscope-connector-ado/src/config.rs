//! Azure DevOps connector configuration.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::rate_limit::RetryConfig;
use crate::{AdoError, AdoResult};

/// Graph API version used by default.
pub const DEFAULT_API_VERSION: &str = "7.1-preview.1";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one Azure DevOps organization.
#[derive(Debug, Clone)]
pub struct AdoConfig {
    pub organization: String,
    pub api_version: String,
    /// Overrides `https://vssps.dev.azure.com/{organization}/_apis/graph`.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl AdoConfig {
    #[must_use]
    pub fn builder() -> AdoConfigBuilder {
        AdoConfigBuilder::default()
    }

    /// Root of the Graph API for this organization, without trailing slash.
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://vssps.dev.azure.com/{}/_apis/graph",
                self.organization
            ),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AdoResult<()> {
        if self.organization.trim().is_empty() {
            return Err(AdoError::Config("organization is required".into()));
        }
        if self.api_version.trim().is_empty() {
            return Err(AdoError::Config("api_version is required".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(AdoError::Config("request_timeout must be > 0".into()));
        }
        if let Some(url) = &self.base_url {
            url::Url::parse(url)?;
        }
        self.retry.validate().map_err(AdoError::Config)
    }
}

/// Builder for [`AdoConfig`].
#[derive(Debug, Default)]
pub struct AdoConfigBuilder {
    organization: Option<String>,
    api_version: Option<String>,
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl AdoConfigBuilder {
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Points the client at a different Graph root (proxies, tests).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> AdoResult<AdoConfig> {
        let config = AdoConfig {
            organization: self
                .organization
                .ok_or_else(|| AdoError::Config("organization is required".into()))?,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            base_url: self.base_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            retry: self.retry.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Personal access token credentials.
#[derive(Clone)]
pub struct AdoCredentials {
    pub pat: SecretString,
}

impl AdoCredentials {
    pub fn new(pat: impl Into<String>) -> Self {
        Self {
            pat: SecretString::from(pat.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pat.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for AdoCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdoCredentials")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AdoConfig::builder().organization("contoso").build().unwrap();

        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(
            config.graph_base_url(),
            "https://vssps.dev.azure.com/contoso/_apis/graph"
        );
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = AdoConfig::builder()
            .organization("contoso")
            .base_url("http://127.0.0.1:8080/_apis/graph/")
            .build()
            .unwrap();
        assert_eq!(config.graph_base_url(), "http://127.0.0.1:8080/_apis/graph");
    }

    #[test]
    fn test_missing_organization_rejected() {
        assert!(matches!(
            AdoConfig::builder().build(),
            Err(AdoError::Config(_))
        ));
        assert!(AdoConfig::builder().organization("  ").build().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = AdoConfig::builder()
            .organization("contoso")
            .base_url("not a url")
            .build();
        assert!(matches!(result, Err(AdoError::Url(_))));
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = AdoCredentials::new("super-secret-pat");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-pat"));
        assert!(!creds.is_empty());
        assert!(AdoCredentials::new(" ").is_empty());
    }
}
