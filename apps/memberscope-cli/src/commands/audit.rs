//! Full organization audit

use clap::Args;
use memberscope_core::{Auditor, CsvReportExporter, ReportExporter};
use serde_json::json;
use tracing::info;

use crate::commands::{cancel_on_ctrl_c, connect};
use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::output::{format_size, print_header, print_key_value, print_success, print_summary, print_warning};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Report file name (default: ado_full_audit_<timestamp>.csv)
    #[arg(long, short)]
    pub output: Option<String>,

    /// Identities audited in parallel
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Only report direct memberships, without expanding nested groups
    #[arg(long)]
    pub direct_only: bool,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AuditArgs, settings: &Settings) -> CliResult<()> {
    let directory = connect(settings)?;

    let mut builder = settings.audit_builder()?;
    if let Some(concurrency) = args.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if args.direct_only {
        builder = builder.expand_nested(false);
    }
    let config = builder.build()?;
    info!(
        organization = %config.organization,
        concurrency = config.concurrency,
        expand_nested = config.expand_nested,
        "Starting audit"
    );

    let auditor = Auditor::new(&directory, config).with_cancellation(cancel_on_ctrl_c());
    let report = auditor.audit_all().await?;

    // Partial reports are still written
    let exporter = CsvReportExporter::new(&settings.export.output_dir);
    let outcome = exporter.export(&report.records, args.output.as_deref())?;
    let size = std::fs::metadata(&outcome.location)?.len();

    if args.json {
        let body = json!({
            "summary": report.summary,
            "report": outcome.location,
            "records_written": outcome.records_written,
            "file_size_bytes": size,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_header("Audit Summary");
        print_summary(&report.summary);
        println!();
        print_key_value("Report", &outcome.location.display().to_string());
        print_key_value("File size", &format_size(size));
        print_success(&format!(
            "Saved {} membership records",
            outcome.records_written
        ));
        if !report.summary.is_complete() && !report.summary.cancelled {
            print_warning("Some identities or groups could not be resolved; see the log for details.");
        }
    }

    if report.summary.cancelled {
        return Err(CliError::Cancelled);
    }
    Ok(())
}
