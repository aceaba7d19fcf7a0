//! Count identities in the organization

use clap::Args;
use memberscope_core::Auditor;

use crate::commands::connect;
use crate::config::Settings;
use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: CountArgs, settings: &Settings) -> CliResult<()> {
    let directory = connect(settings)?;
    let config = settings.audit_builder()?.build()?;
    let total = Auditor::new(&directory, config).count_identities().await?;

    if args.json {
        println!("{}", serde_json::json!({ "identities": total }));
    } else {
        println!("Total users: {total}");
    }
    Ok(())
}
