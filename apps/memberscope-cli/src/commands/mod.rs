//! Subcommand implementations.

pub mod audit;
pub mod count;
pub mod user;

use memberscope_connector_ado::AdoDirectory;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::{credentials_from_env, Settings};
use crate::error::CliResult;

/// Builds the Azure DevOps directory client from settings and the environment.
pub fn connect(settings: &Settings) -> CliResult<AdoDirectory> {
    let config = settings.ado_config()?;
    let credentials = credentials_from_env()?;
    Ok(AdoDirectory::new(&config, &credentials)?)
}

/// Returns a token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight work");
            child.cancel();
        }
    });
    token
}
