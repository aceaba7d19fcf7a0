//! Scope classification of groups from their naming conventions.
//!
//! Project groups are named `[Project]\Group`. Organization built-ins either
//! carry no brackets or use the reserved built-in principal prefix. The rules
//! are ordered; anything unrecognized falls back to the organization scope.

use crate::config::{AuditConfig, DEFAULT_BUILTIN_PREFIX, DEFAULT_ORG_ADMIN_GROUP};
use crate::model::{Group, ScopeClassification};

/// Classifies groups into organization or project scope.
#[derive(Debug, Clone)]
pub struct ScopeClassifier {
    organization: String,
    org_admin_group: String,
    builtin_prefix: String,
}

impl ScopeClassifier {
    /// Creates a classifier with the default built-in names.
    #[must_use]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            org_admin_group: DEFAULT_ORG_ADMIN_GROUP.to_string(),
            builtin_prefix: DEFAULT_BUILTIN_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            organization: config.organization.clone(),
            org_admin_group: config.org_admin_group.clone(),
            builtin_prefix: config.builtin_prefix.clone(),
        }
    }

    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Classifies a group. Never fails.
    #[must_use]
    pub fn classify(&self, group: &Group) -> ScopeClassification {
        self.classify_names(group.display_name(), &group.principal_name)
    }

    /// Classifies from the raw display and principal names.
    #[must_use]
    pub fn classify_names(&self, display_name: &str, principal_name: &str) -> ScopeClassification {
        if display_name == self.org_admin_group
            || principal_name.starts_with(&self.builtin_prefix)
            || !principal_name.contains('[')
        {
            return self.org_scope();
        }

        if principal_name.starts_with('[') && principal_name.contains(']') {
            if let Some(project) = bracketed_project(principal_name) {
                if project.to_lowercase() == self.organization.to_lowercase() {
                    return self.org_scope();
                }
                return ScopeClassification::project(project);
            }
            return self.org_scope();
        }

        self.org_scope()
    }

    fn org_scope(&self) -> ScopeClassification {
        ScopeClassification::organization(self.organization.clone())
    }
}

/// Extracts `Project` from `[Project]\Group`, or `None` if the brackets are empty.
fn bracketed_project(principal_name: &str) -> Option<&str> {
    let head = principal_name.split(']').next().unwrap_or_default();
    let project = head.trim_matches('[');
    (!project.is_empty()).then_some(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScopeType;

    const ORG: &str = "parmeshwargudadhe";

    fn classifier() -> ScopeClassifier {
        ScopeClassifier::new(ORG)
    }

    fn group(display_name: &str, principal_name: &str) -> Group {
        Group {
            descriptor: "vssgp.test".into(),
            display_name: Some(display_name.into()),
            principal_name: principal_name.into(),
            description: String::new(),
        }
    }

    #[test]
    fn test_collection_admins_is_organization() {
        let scope = classifier().classify(&group("Project Collection Administrators", "vssgp.XYZ"));
        assert_eq!(scope, ScopeClassification::organization(ORG));
    }

    #[test]
    fn test_collection_admins_wins_over_brackets() {
        let scope = classifier().classify(&group(
            "Project Collection Administrators",
            "[Contoso]\\Project Collection Administrators",
        ));
        assert_eq!(scope.scope_type, ScopeType::Organization);
    }

    #[test]
    fn test_builtin_prefix_is_organization() {
        let scope = classifier().classify(&group("Anything", "vssgp.Uy0xLTktMTU1MQ"));
        assert_eq!(scope.scope_type, ScopeType::Organization);
    }

    #[test]
    fn test_project_group() {
        let scope = classifier().classify(&group("Contributors", "[Contoso]\\Contributors"));
        assert_eq!(scope, ScopeClassification::project("Contoso"));
    }

    #[test]
    fn test_bracket_matching_org_is_organization() {
        let scope = classifier().classify(&group("Readers", "[parmeshwargudadhe]\\Readers"));
        assert_eq!(scope, ScopeClassification::organization(ORG));

        let upper = classifier().classify(&group("Readers", "[PARMESHWARGUDADHE]\\Readers"));
        assert_eq!(upper.scope_type, ScopeType::Organization);
    }

    #[test]
    fn test_empty_brackets_is_organization() {
        let scope = classifier().classify(&group("Readers", "[]\\Readers"));
        assert_eq!(scope, ScopeClassification::organization(ORG));
    }

    #[test]
    fn test_no_brackets_is_organization() {
        let scope = classifier().classify(&group("Build Service", "Build Service (contoso)"));
        assert_eq!(scope.scope_type, ScopeType::Organization);

        let empty = classifier().classify(&group("", ""));
        assert_eq!(empty.scope_type, ScopeType::Organization);
    }

    #[test]
    fn test_bracket_not_leading_falls_back_to_organization() {
        let scope = classifier().classify(&group("Odd", "Team [Contoso]\\Odd"));
        assert_eq!(scope, ScopeClassification::organization(ORG));
    }

    #[test]
    fn test_unclosed_bracket_falls_back_to_organization() {
        let scope = classifier().classify(&group("Odd", "[Contoso\\Odd"));
        assert_eq!(scope.scope_type, ScopeType::Organization);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = classifier();
        let g = group("Contributors", "[Fabrikam]\\Contributors");
        assert_eq!(c.classify(&g), c.classify(&g));
    }

    #[test]
    fn test_missing_display_name() {
        let mut g = group("", "[Fabrikam]\\Readers");
        g.display_name = None;
        assert_eq!(classifier().classify(&g), ScopeClassification::project("Fabrikam"));
    }

    #[test]
    fn test_from_config_uses_custom_names() {
        let config = AuditConfig::builder()
            .organization("contoso")
            .org_admin_group("Org Owners")
            .builtin_prefix("builtin:")
            .build()
            .unwrap();
        let c = ScopeClassifier::from_config(&config);

        assert_eq!(
            c.classify(&group("Org Owners", "[Fabrikam]\\Org Owners")).scope_type,
            ScopeType::Organization
        );
        assert_eq!(
            c.classify(&group("X", "builtin:[Fabrikam]\\X")).scope_type,
            ScopeType::Organization
        );
        assert_eq!(c.organization(), "contoso");
    }
}
