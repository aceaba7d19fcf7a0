//! Report export.
//!
//! CSV layout, one row per (identity, group):
//! User Email, User Display Name, Group Name, Group Principal Name,
//! Scope Type, Scope Name, Group Description

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::AuditResult;
use crate::model::AuditRecord;

/// Where a report was written and how many membership rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub location: PathBuf,
    /// Rows excluding "no memberships" placeholders.
    pub records_written: usize,
}

/// Sink for audit records.
pub trait ReportExporter {
    /// Writes `records` to `file_name`, or to a generated name when `None`.
    fn export(&self, records: &[AuditRecord], file_name: Option<&str>)
        -> AuditResult<ExportOutcome>;
}

/// Writes audit records as CSV files into a directory.
#[derive(Debug, Clone)]
pub struct CsvReportExporter {
    output_dir: PathBuf,
}

impl Default for CsvReportExporter {
    fn default() -> Self {
        Self::new(".")
    }
}

impl CsvReportExporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Picks a file name: per-user when every record belongs to one
    /// identity, full-audit otherwise.
    #[must_use]
    pub fn default_file_name(records: &[AuditRecord]) -> String {
        match records.first() {
            Some(first)
                if records
                    .iter()
                    .all(|r| r.principal_name == first.principal_name) =>
            {
                user_file_name(&first.principal_name)
            }
            _ => full_audit_file_name(),
        }
    }
}

impl ReportExporter for CsvReportExporter {
    fn export(
        &self,
        records: &[AuditRecord],
        file_name: Option<&str>,
    ) -> AuditResult<ExportOutcome> {
        let name = match file_name {
            Some(name) if name.ends_with(".csv") => name.to_string(),
            Some(name) => format!("{name}.csv"),
            None => Self::default_file_name(records),
        };
        let location = self.output_dir.join(name);

        let file = File::create(&location)?;
        let records_written = write_csv(records, file)?;

        info!(
            path = %location.display(),
            records = records_written,
            "Report exported"
        );

        Ok(ExportOutcome {
            location,
            records_written,
        })
    }
}

/// Serializes `records` to `writer` and returns the number of membership rows.
pub fn write_csv<W: Write>(records: &[AuditRecord], writer: W) -> AuditResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    Ok(records.iter().filter(|r| !r.is_sentinel()).count())
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `ado_full_audit_<timestamp>.csv`
#[must_use]
pub fn full_audit_file_name() -> String {
    format!("ado_full_audit_{}.csv", timestamp())
}

/// `ado_groups_<local-part>_<timestamp>.csv`
#[must_use]
pub fn user_file_name(principal_name: &str) -> String {
    let local = principal_name.split('@').next().unwrap_or(principal_name);
    format!("ado_groups_{}_{}.csv", local, timestamp())
}
