//! memberscope - audit Azure DevOps user group memberships
//!
//! This CLI enables administrators to:
//! - List every group one user belongs to, with its organization or project scope
//! - Audit all users of an organization into a CSV report
//! - Count the users in an organization

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod error;
mod logging;
mod output;

use config::Settings;
use error::CliResult;
use logging::LogFormat;

/// memberscope - Azure DevOps group membership audit
#[derive(Parser)]
#[command(name = "memberscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: ./memberscope.yaml)
    #[arg(long, global = true, env = "MEMBERSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Azure DevOps organization
    #[arg(long, global = true)]
    org: Option<String>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and export the groups of one user
    User(commands::user::UserArgs),

    /// Audit every user in the organization
    Audit(commands::audit::AuditArgs),

    /// Count users in the organization
    Count(commands::count::CountArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env_overrides();
    if let Some(org) = cli.org {
        settings.organization = Some(org);
    }

    let level = cli
        .log_level
        .unwrap_or_else(|| settings.logging.level.clone());
    let format = match cli.log_format {
        Some(format) => format,
        None => settings.logging.format.parse()?,
    };
    logging::init_logging(&level, format)?;

    match cli.command {
        Commands::User(args) => commands::user::execute(args, &settings).await,
        Commands::Audit(args) => commands::audit::execute(args, &settings).await,
        Commands::Count(args) => commands::count::execute(args, &settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_audit_flags() {
        let cli = Cli::try_parse_from([
            "memberscope",
            "--org",
            "contoso",
            "audit",
            "--concurrency",
            "4",
            "--direct-only",
        ])
        .unwrap();

        assert_eq!(cli.org.as_deref(), Some("contoso"));
        match cli.command {
            Commands::Audit(args) => {
                assert_eq!(args.concurrency, Some(4));
                assert!(args.direct_only);
            }
            _ => panic!("expected audit command"),
        }
    }

    #[test]
    fn test_parse_user_with_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "memberscope",
            "user",
            "jane@contoso.com",
            "--no-export",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Commands::User(args) => {
                assert_eq!(args.email, "jane@contoso.com");
                assert!(args.no_export);
            }
            _ => panic!("expected user command"),
        }
    }
}
