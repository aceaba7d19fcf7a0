//! CLI settings: YAML file, then environment, then command-line flags.
//!
//! The personal access token is only ever read from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use memberscope_connector_ado::{AdoConfig, AdoCredentials, RetryConfig, DEFAULT_API_VERSION};
use memberscope_core::{
    AuditConfig, AuditConfigBuilder, DEFAULT_BUILTIN_PREFIX, DEFAULT_EXCLUDED_GROUP,
    DEFAULT_ORG_ADMIN_GROUP,
};
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Default settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "./memberscope.yaml";

/// Environment variables holding the PAT, in lookup order.
pub const PAT_ENV_VARS: [&str; 2] = ["MEMBERSCOPE_PAT", "AZURE_DEVOPS_PAT"];

/// Settings file contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub directory: DirectorySettings,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Azure DevOps connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorySettings {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

/// Audit engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSettings {
    #[serde(default = "default_excluded_groups")]
    pub excluded_groups: Vec<String>,
    #[serde(default = "default_org_admin_group")]
    pub org_admin_group: String,
    #[serde(default = "default_builtin_prefix")]
    pub builtin_prefix: String,
    #[serde(default = "default_true")]
    pub expand_nested: bool,
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per directory call; 0 disables the limit.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_identity_delay_ms")]
    pub identity_delay_ms: u64,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            excluded_groups: default_excluded_groups(),
            org_admin_group: default_org_admin_group(),
            builtin_prefix: default_builtin_prefix(),
            expand_nested: true,
            max_nesting_depth: default_max_nesting_depth(),
            concurrency: default_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
            page_delay_ms: default_page_delay_ms(),
            identity_delay_ms: default_identity_delay_ms(),
        }
    }
}

fn default_excluded_groups() -> Vec<String> {
    vec![DEFAULT_EXCLUDED_GROUP.to_string()]
}

fn default_org_admin_group() -> String {
    DEFAULT_ORG_ADMIN_GROUP.to_string()
}

fn default_builtin_prefix() -> String {
    DEFAULT_BUILTIN_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_nesting_depth() -> u32 {
    16
}

fn default_concurrency() -> usize {
    1
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_identity_delay_ms() -> u64 {
    100
}

/// Report output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Settings {
    /// Loads settings from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = PathBuf::from(Self::config_path());
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Get the configuration file path from environment or default.
    pub fn config_path() -> String {
        std::env::var("MEMBERSCOPE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(org) = lookup("MEMBERSCOPE_ORG").filter(|v| !v.trim().is_empty()) {
            self.organization = Some(org);
        }
        if let Some(dir) = lookup("MEMBERSCOPE_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }
        if let Some(concurrency) = lookup("MEMBERSCOPE_CONCURRENCY") {
            if let Ok(concurrency) = concurrency.parse() {
                self.audit.concurrency = concurrency;
            }
        }
    }

    /// Organization name, required for every command.
    pub fn organization(&self) -> CliResult<&str> {
        self.organization
            .as_deref()
            .filter(|org| !org.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config(
                    "organization not set (use --org, MEMBERSCOPE_ORG or the settings file)"
                        .to_string(),
                )
            })
    }

    /// Audit engine configuration builder seeded from these settings.
    pub fn audit_builder(&self) -> CliResult<AuditConfigBuilder> {
        let audit = &self.audit;
        let call_timeout =
            (audit.call_timeout_secs > 0).then(|| Duration::from_secs(audit.call_timeout_secs));

        Ok(AuditConfig::builder()
            .organization(self.organization()?)
            .excluded_groups(audit.excluded_groups.clone())
            .org_admin_group(audit.org_admin_group.clone())
            .builtin_prefix(audit.builtin_prefix.clone())
            .expand_nested(audit.expand_nested)
            .max_nesting_depth(audit.max_nesting_depth)
            .concurrency(audit.concurrency)
            .call_timeout(call_timeout)
            .page_delay(Duration::from_millis(audit.page_delay_ms))
            .identity_delay(Duration::from_millis(audit.identity_delay_ms)))
    }

    /// Connector configuration.
    pub fn ado_config(&self) -> CliResult<AdoConfig> {
        let directory = &self.directory;
        let retry = RetryConfig {
            base_delay_ms: directory.retry_base_delay_ms,
            max_retries: directory.max_retries,
            ..RetryConfig::default()
        };

        let mut builder = AdoConfig::builder()
            .organization(self.organization()?)
            .api_version(directory.api_version.clone())
            .request_timeout(Duration::from_secs(directory.request_timeout_secs))
            .retry(retry);
        if let Some(url) = &directory.base_url {
            builder = builder.base_url(url.clone());
        }
        Ok(builder.build()?)
    }
}

/// Reads the PAT from the environment.
pub fn credentials_from_env() -> CliResult<AdoCredentials> {
    credentials_from(|key| std::env::var(key).ok())
}

fn credentials_from<F>(lookup: F) -> CliResult<AdoCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    PAT_ENV_VARS
        .iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        .map(AdoCredentials::new)
        .ok_or(CliError::MissingPat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_minimal_config() {
        let settings = Settings::from_yaml("organization: contoso\n").unwrap();

        assert_eq!(settings.organization.as_deref(), Some("contoso"));
        assert_eq!(settings.audit.excluded_groups, ["Security Service Group"]);
        assert_eq!(settings.audit.concurrency, 1);
        assert!(settings.audit.expand_nested);
        assert_eq!(settings.directory.api_version, "7.1-preview.1");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
organization: contoso
directory:
  api_version: "7.0"
  request_timeout_secs: 10
audit:
  excluded_groups: ["Security Service Group", "Project Valid Users"]
  expand_nested: false
  concurrency: 4
  call_timeout_secs: 0
export:
  output_dir: /tmp/reports
logging:
  level: debug
  format: json
"#;
        let settings = Settings::from_yaml(yaml).unwrap();

        assert_eq!(settings.audit.excluded_groups.len(), 2);
        assert_eq!(settings.export.output_dir, PathBuf::from("/tmp/reports"));

        let audit = settings.audit_builder().unwrap().build().unwrap();
        assert!(!audit.expand_nested);
        assert_eq!(audit.concurrency, 4);
        assert!(audit.call_timeout.is_none());

        let ado = settings.ado_config().unwrap();
        assert_eq!(ado.api_version, "7.0");
        assert_eq!(ado.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_pat_in_file_rejected() {
        assert!(Settings::from_yaml("organization: contoso\npat: secret\n").is_err());
    }

    #[test]
    fn test_pat_in_nested_section_rejected() {
        for section in ["directory", "audit", "export", "logging"] {
            let yaml = format!("organization: contoso\n{section}:\n  pat: secret\n");
            assert!(Settings::from_yaml(&yaml).is_err(), "{section} accepted a pat");
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::from_yaml("organization: fromfile\n").unwrap();
        settings.apply_overrides_from(env(&[
            ("MEMBERSCOPE_ORG", "fromenv"),
            ("MEMBERSCOPE_CONCURRENCY", "8"),
        ]));

        assert_eq!(settings.organization().unwrap(), "fromenv");
        assert_eq!(settings.audit.concurrency, 8);
    }

    #[test]
    fn test_missing_organization() {
        let settings = Settings::default();
        assert!(matches!(settings.organization(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_credentials_lookup_order() {
        assert!(matches!(
            credentials_from(env(&[])),
            Err(CliError::MissingPat)
        ));
        assert!(credentials_from(env(&[("AZURE_DEVOPS_PAT", "p2")])).is_ok());
        assert!(matches!(
            credentials_from(env(&[("MEMBERSCOPE_PAT", " ")])),
            Err(CliError::MissingPat)
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memberscope.yaml");
        std::fs::write(&path, "organization: contoso\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.organization().unwrap(), "contoso");

        assert!(Settings::load(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
