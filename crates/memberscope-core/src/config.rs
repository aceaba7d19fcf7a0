//! Audit run configuration.

use std::time::Duration;

use crate::error::{AuditError, AuditResult};

/// Built-in group that grants organization-wide administration.
pub const DEFAULT_ORG_ADMIN_GROUP: &str = "Project Collection Administrators";

/// Principal-name prefix of built-in directory groups.
pub const DEFAULT_BUILTIN_PREFIX: &str = "vssgp.";

/// Internal group that is never reported.
pub const DEFAULT_EXCLUDED_GROUP: &str = "Security Service Group";

/// Settings for one audit run.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Organization identifier, used as the organization scope name.
    pub organization: String,
    /// Group display names that are dropped from the report.
    pub excluded_groups: Vec<String>,
    /// Display name of the built-in organization administrators group.
    pub org_admin_group: String,
    /// Principal-name prefix marking built-in groups.
    pub builtin_prefix: String,
    /// Follow nested group containment upward from direct memberships.
    pub expand_nested: bool,
    /// Maximum number of nesting levels followed when expanding.
    pub max_nesting_depth: u32,
    /// Identities audited concurrently (1 = sequential).
    pub concurrency: usize,
    /// Deadline applied to every directory call.
    pub call_timeout: Option<Duration>,
    /// Pause between identity listing pages.
    pub page_delay: Duration,
    /// Pause after each audited identity.
    pub identity_delay: Duration,
}

impl AuditConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuditResult<()> {
        if self.organization.trim().is_empty() {
            return Err(AuditError::Config("organization is required".into()));
        }
        if self.concurrency == 0 {
            return Err(AuditError::Config("concurrency must be >= 1".into()));
        }
        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err(AuditError::Config("call_timeout must be > 0".into()));
        }
        Ok(())
    }
}

/// Builder for [`AuditConfig`].
#[derive(Debug, Clone)]
pub struct AuditConfigBuilder {
    organization: Option<String>,
    excluded_groups: Vec<String>,
    org_admin_group: String,
    builtin_prefix: String,
    expand_nested: bool,
    max_nesting_depth: u32,
    concurrency: usize,
    call_timeout: Option<Duration>,
    page_delay: Duration,
    identity_delay: Duration,
}

impl Default for AuditConfigBuilder {
    fn default() -> Self {
        Self {
            organization: None,
            excluded_groups: vec![DEFAULT_EXCLUDED_GROUP.to_string()],
            org_admin_group: DEFAULT_ORG_ADMIN_GROUP.to_string(),
            builtin_prefix: DEFAULT_BUILTIN_PREFIX.to_string(),
            expand_nested: true,
            max_nesting_depth: 16,
            concurrency: 1,
            call_timeout: Some(Duration::from_secs(30)),
            page_delay: Duration::from_millis(200),
            identity_delay: Duration::from_millis(100),
        }
    }
}

impl AuditConfigBuilder {
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Replaces the excluded group list.
    #[must_use]
    pub fn excluded_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn org_admin_group(mut self, name: impl Into<String>) -> Self {
        self.org_admin_group = name.into();
        self
    }

    #[must_use]
    pub fn builtin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.builtin_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn expand_nested(mut self, expand: bool) -> Self {
        self.expand_nested = expand;
        self
    }

    #[must_use]
    pub fn max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    #[must_use]
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    #[must_use]
    pub fn identity_delay(mut self, delay: Duration) -> Self {
        self.identity_delay = delay;
        self
    }

    /// Disables all pacing delays.
    #[must_use]
    pub fn without_pacing(self) -> Self {
        self.page_delay(Duration::ZERO).identity_delay(Duration::ZERO)
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> AuditResult<AuditConfig> {
        let config = AuditConfig {
            organization: self
                .organization
                .ok_or_else(|| AuditError::Config("organization is required".into()))?,
            excluded_groups: self.excluded_groups,
            org_admin_group: self.org_admin_group,
            builtin_prefix: self.builtin_prefix,
            expand_nested: self.expand_nested,
            max_nesting_depth: self.max_nesting_depth,
            concurrency: self.concurrency,
            call_timeout: self.call_timeout,
            page_delay: self.page_delay,
            identity_delay: self.identity_delay,
        };
        config.validate()?;
        Ok(config)
    }
}
