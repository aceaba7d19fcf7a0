//! Directory objects and the exported audit record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Group name written on the single row emitted for an identity without memberships.
pub const NO_MEMBERSHIPS: &str = "No group memberships";

/// Display name used when an identity has none.
pub const MISSING_USER_DISPLAY_NAME: &str = "N/A";

/// Display name used when a group has none.
pub const MISSING_GROUP_DISPLAY_NAME: &str = "Unknown";

/// Subject kind carried by user principals.
pub const USER_SUBJECT_KIND: &str = "user";

/// Raw entry returned by an identity listing page, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptor: String,
    #[serde(default)]
    pub subject_kind: Option<String>,
    #[serde(default)]
    pub principal_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// One page of an identity listing.
#[derive(Debug, Clone, Default)]
pub struct IdentityPage {
    pub entries: Vec<SubjectEntry>,
    /// Continuation cursor; `None` marks the last page.
    pub next_cursor: Option<String>,
}

/// A directory user principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Opaque handle used as the membership traversal key.
    pub descriptor: String,
    /// Email-like identifier, always contains `@`.
    pub principal_name: String,
    pub display_name: Option<String>,
}

impl Identity {
    /// Returns the display name, or `N/A` when the directory has none.
    #[must_use]
    pub fn display_name_or_default(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(MISSING_USER_DISPLAY_NAME)
    }
}

/// Group metadata as returned by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptor: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// May encode a project as `[Project]\Name`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub principal_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Group {
    /// Returns the display name, or an empty string when the directory has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_default()
    }
}

/// Administrative boundary of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeType {
    Organization,
    Project,
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => write!(f, "Organization"),
            Self::Project => write!(f, "Project"),
        }
    }
}

/// Derived scope of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeClassification {
    pub scope_type: ScopeType,
    pub scope_name: String,
}

impl ScopeClassification {
    #[must_use]
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            scope_type: ScopeType::Organization,
            scope_name: name.into(),
        }
    }

    #[must_use]
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            scope_type: ScopeType::Project,
            scope_name: name.into(),
        }
    }
}

/// One row of the audit report.
///
/// Field renames match the report column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    #[serde(rename = "User Email")]
    pub principal_name: String,
    #[serde(rename = "User Display Name")]
    pub display_name: String,
    #[serde(rename = "Group Name")]
    pub group_name: String,
    #[serde(rename = "Group Principal Name")]
    pub group_principal_name: String,
    #[serde(rename = "Scope Type")]
    pub scope_type: Option<ScopeType>,
    #[serde(rename = "Scope Name")]
    pub scope_name: String,
    #[serde(rename = "Group Description")]
    pub group_description: String,
}

impl AuditRecord {
    /// Builds the record for one (identity, group) pair.
    #[must_use]
    pub fn membership(identity: &Identity, group: &Group, scope: ScopeClassification) -> Self {
        Self {
            principal_name: identity.principal_name.clone(),
            display_name: identity.display_name_or_default().to_string(),
            group_name: group
                .display_name
                .clone()
                .unwrap_or_else(|| MISSING_GROUP_DISPLAY_NAME.to_string()),
            group_principal_name: group.principal_name.clone(),
            scope_type: Some(scope.scope_type),
            scope_name: scope.scope_name,
            group_description: group.description.clone(),
        }
    }

    /// Builds the placeholder record for an identity with no reportable groups.
    #[must_use]
    pub fn no_memberships(identity: &Identity) -> Self {
        Self {
            principal_name: identity.principal_name.clone(),
            display_name: identity.display_name_or_default().to_string(),
            group_name: NO_MEMBERSHIPS.to_string(),
            group_principal_name: String::new(),
            scope_type: None,
            scope_name: String::new(),
            group_description: String::new(),
        }
    }

    /// Returns true for the placeholder row of an identity without memberships.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.scope_type.is_none()
    }
}
