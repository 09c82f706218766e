//! CLI argument parsing for lockfile.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use lockfile::locks::BackendKind;
use std::path::PathBuf;

/// Lockfile: advisory cross-process locks on filesystem paths.
///
/// Every command takes the path of the resource being guarded. The claim
/// artifact lives next to it (`<path>.lock`) or, for the pidfile backend,
/// is the path itself.
#[derive(Parser, Debug)]
#[command(name = "lockfile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML config file (backend, timeouts, polling).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend to use, overriding the config.
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lockfile.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether a path is locked, and by whom.
    Status(StatusArgs),

    /// Forcibly remove a lock left behind by a crashed holder.
    ///
    /// Only use this when you are certain the holder is gone.
    Break(BreakArgs),

    /// Run a command while holding the lock.
    ///
    /// Exits with the command's exit code.
    Exec(ExecArgs),

    /// Print the process id recorded in a pidfile.
    Pid(PidArgs),
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Resource path.
    pub path: PathBuf,

    /// Print the lock info as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `break` command.
#[derive(Parser, Debug)]
pub struct BreakArgs {
    /// Resource path.
    pub path: PathBuf,

    /// Confirm that the lock should be broken.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `exec` command.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Resource path.
    pub path: PathBuf,

    /// Seconds to wait for the lock (0 or less tries once; default waits forever).
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<f64>,

    /// Command to run, after `--`.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Arguments for the `pid` command.
#[derive(Parser, Debug)]
pub struct PidArgs {
    /// Pidfile path.
    pub path: PathBuf,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    let kind = BackendKind::from_str(s).ok_or_else(|| {
        let names: Vec<_> = BackendKind::ALL.iter().map(BackendKind::as_str).collect();
        format!("unknown backend '{}' (expected one of: {})", s, names.join(", "))
    })?;
    if !kind.is_available() {
        return Err(format!("backend '{}' is not available on this platform", s));
    }
    Ok(kind)
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
