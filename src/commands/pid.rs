//! Implementation of the `lockfile pid` command.

use crate::cli::PidArgs;
use lockfile::error::{LockfileError, Result};
use lockfile::locks::read_pid_from_pidfile;

/// Execute the `lockfile pid` command: print the pid recorded in a pidfile.
pub fn cmd_pid(args: PidArgs) -> Result<()> {
    let path = &args.path;
    let pid = read_pid_from_pidfile(path).map_err(|e| {
        LockfileError::UserError(format!("failed to read pidfile '{}': {}", path.display(), e))
    })?;

    match pid {
        Some(pid) => {
            println!("{}", pid);
            Ok(())
        }
        None if !path.exists() => Err(LockfileError::NotLocked { path: path.clone() }),
        None => Err(LockfileError::UserError(format!(
            "'{}' does not contain a process id",
            path.display()
        ))),
    }
}
