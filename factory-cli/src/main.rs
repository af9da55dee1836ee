// External crates
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

// Internal imports
use factory_messages::{msg, MESSAGES};

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

#[tokio::main]
async fn main() -> ExitCode {
    // Keep the guard alive so buffered file output is flushed on exit
    let _log_guard = factory_logging::init_subscriber();

    let args = Args::parse();
    debug!(command = ?args.command, "Starting factory-loader");

    match execute_command(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!(
                "{}",
                msg!(MESSAGES.cli.outcome_failed, error = format!("{e:#}"))
            );
            ExitCode::FAILURE
        }
    }
}
