//! Audit one user's group memberships

use clap::Args;
use memberscope_core::{Auditor, CsvReportExporter, ReportExporter};

use crate::commands::{cancel_on_ctrl_c, connect};
use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::output::{print_group_table, print_header, print_success};

#[derive(Args, Debug)]
pub struct UserArgs {
    /// Principal name (email) of the user, matched ignoring case
    pub email: String,

    /// Report file name (default: ado_groups_<user>_<timestamp>.csv)
    #[arg(long, short)]
    pub output: Option<String>,

    /// Print results without writing a report file
    #[arg(long)]
    pub no_export: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: UserArgs, settings: &Settings) -> CliResult<()> {
    let email = args.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CliError::Config(format!(
            "'{}' is not a valid principal name",
            args.email
        )));
    }

    let directory = connect(settings)?;
    let config = settings.audit_builder()?.build()?;
    let auditor = Auditor::new(&directory, config).with_cancellation(cancel_on_ctrl_c());

    let report = auditor.audit_one(email).await?;
    if report.summary.cancelled {
        return Err(CliError::Cancelled);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.records.iter().all(|r| r.is_sentinel()) {
        println!("No groups found for {email}.");
    } else {
        print_header(&format!("Groups for {email}"));
        print_group_table(&report.records);
        println!();
        println!("Total groups: {}", report.summary.records);
    }

    if !args.no_export {
        let exporter = CsvReportExporter::new(&settings.export.output_dir);
        let outcome = exporter.export(&report.records, args.output.as_deref())?;
        if !args.json {
            print_success(&format!(
                "Saved {} groups to {}",
                outcome.records_written,
                outcome.location.display()
            ));
        }
    }

    Ok(())
}
