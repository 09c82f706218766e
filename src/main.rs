//! Lockfile: advisory cross-process locks on filesystem paths.
//!
//! This is the main entry point for the `lockfile` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use lockfile::error::LockfileError;
use lockfile::exit_codes;
use std::process::ExitCode;

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // The child already reported its own failure
            if !matches!(err, LockfileError::CommandFailed { .. }) {
                eprintln!("Error: {}", err);
            }

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
