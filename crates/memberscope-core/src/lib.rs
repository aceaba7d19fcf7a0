//! Directory group-membership audit engine.
//!
//! Given a [`DirectoryClient`], the engine enumerates user identities,
//! resolves the groups each one belongs to (optionally through nested
//! groups), fetches group metadata through a run-scoped single-flight cache,
//! classifies every group as organization- or project-scoped, and emits one
//! [`AuditRecord`] per (identity, group) pair.
//!
//! # Example
//!
//! ```no_run
//! use memberscope_core::{AuditConfig, Auditor, CsvReportExporter, ReportExporter};
//! use memberscope_core::mock::MockDirectory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = MockDirectory::new();
//! let config = AuditConfig::builder().organization("contoso").build()?;
//!
//! let report = Auditor::new(&directory, config).audit_all().await?;
//! println!("{}", report.summary);
//!
//! let outcome = CsvReportExporter::default().export(&report.records, None)?;
//! println!("wrote {}", outcome.location.display());
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod config;
mod directory;
mod error;
mod export;
mod groups;
mod lister;
mod membership;
mod model;
mod scope;
mod summary;

pub mod mock;

// Re-exports
pub use aggregator::{AuditReport, Auditor};
pub use config::{
    AuditConfig, AuditConfigBuilder, DEFAULT_BUILTIN_PREFIX, DEFAULT_EXCLUDED_GROUP,
    DEFAULT_ORG_ADMIN_GROUP,
};
pub use directory::DirectoryClient;
pub use error::{AuditError, AuditResult, DirectoryError};
pub use export::{
    full_audit_file_name, user_file_name, write_csv, CsvReportExporter, ExportOutcome,
    ReportExporter,
};
pub use groups::{GroupCache, GroupResolver};
pub use lister::{qualify, IdentityLister};
pub use membership::{MembershipResolver, UpwardMembership};
pub use model::{
    AuditRecord, Group, Identity, IdentityPage, ScopeClassification, ScopeType, SubjectEntry,
    MISSING_GROUP_DISPLAY_NAME, MISSING_USER_DISPLAY_NAME, NO_MEMBERSHIPS, USER_SUBJECT_KIND,
};
pub use scope::ScopeClassifier;
pub use summary::{AuditSummary, IdentityOutcome, IdentityStatus};
