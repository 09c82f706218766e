//! Implementation of the `lockfile exec` command.
//!
//! Runs a child process while holding the lock. The lock is held by this
//! process (not a single thread) and released once the child exits, whatever
//! its exit status.

use crate::cli::ExecArgs;
use lockfile::config::Config;
use lockfile::error::{LockfileError, Result};
use lockfile::exit_codes;
use lockfile::locks::FileLock;
use std::process::{Command, ExitStatus};
use tracing::info;

/// Execute the `lockfile exec` command.
pub fn cmd_exec(args: ExecArgs, config: &Config) -> Result<()> {
    let argv = command_words(&args.command)?;

    let mut config = config.clone();
    config.threaded = false;
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
        config.validate()?;
    }

    let mut lock = FileLock::from_config(&args.path, &config)?;
    lock.acquire(config.acquire_timeout())?;
    info!(path = %lock.path().display(), command = %argv[0], "running command under lock");

    let status = run_child(&argv);
    let released = lock.release();
    let status = status?;
    released?;

    match exit_code_of(status) {
        exit_codes::SUCCESS => Ok(()),
        code => Err(LockfileError::CommandFailed { code }),
    }
}

/// Turn the trailing arguments into an argv.
///
/// A single argument containing whitespace is split shell-style, so both
/// `exec p -- make test` and `exec p -- "make test"` work. No shell is run.
pub(super) fn command_words(command: &[String]) -> Result<Vec<String>> {
    let words = match command {
        [single] if single.trim().contains(char::is_whitespace) => {
            shell_words::split(single).map_err(|e| {
                LockfileError::UserError(format!(
                    "failed to parse command '{}': {}\n\n\
                     Fix: check for unmatched quotes or invalid escape sequences.",
                    single, e
                ))
            })?
        }
        _ => command.to_vec(),
    };

    if words.is_empty() || words[0].is_empty() {
        return Err(LockfileError::UserError(
            "no command given to run under the lock".to_string(),
        ));
    }
    Ok(words)
}

fn run_child(argv: &[String]) -> Result<ExitStatus> {
    let program = &argv[0];
    Command::new(program)
        .args(&argv[1..])
        .status()
        .map_err(|e| {
            LockfileError::UserError(format!(
                "failed to execute '{}': {}\n\n\
                 Fix: ensure the command is installed and in PATH.",
                program, e
            ))
        })
}

/// Exit code to report for a finished child. Death by signal maps to
/// `128 + signal` as shells do.
pub(super) fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    exit_codes::USER_ERROR
}
