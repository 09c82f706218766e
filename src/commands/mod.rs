//! Command implementations for lockfile.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, after resolving the config shared by all of them.

mod break_cmd;
mod exec;
mod pid;
mod status;


use crate::cli::{Cli, Command};
use lockfile::config::Config;
use lockfile::error::Result;
use lockfile::locks::BackendKind;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.backend)?;

    match cli.command {
        Command::Status(args) => status::cmd_status(args, &config),
        Command::Break(args) => break_cmd::cmd_break(args, &config),
        Command::Exec(args) => exec::cmd_exec(args, &config),
        Command::Pid(args) => pid::cmd_pid(args),
    }
}

/// Load the config file if one was given, then apply `--backend`.
pub(crate) fn resolve_config(path: Option<&Path>, backend: Option<BackendKind>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(backend) = backend {
        config.backend = backend;
        config.validate()?;
    }
    tracing::debug!(backend = %config.backend, threaded = config.threaded, "resolved config");
    Ok(config)
}
