//! Command dispatch: bridges CLI args -> integration -> output formatting.

pub mod config_cmd;
pub mod run;
pub mod status;

use erovinieta_core::Integration;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a portal-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    integration: &Integration,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Run => run::handle(integration, global).await,
        Command::Status => status::handle_status(integration, global),
        Command::Snapshot => status::handle_snapshot(integration, global),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not need a portal session".into(),
        }),
    }
}
