//! Implementation of the `lockfile break` command.

use crate::cli::BreakArgs;
use lockfile::config::Config;
use lockfile::error::{LockfileError, Result};
use lockfile::locks::FileLock;

/// Execute the `lockfile break` command.
///
/// Refuses to run without `--force`. Breaking a lock whose holder is still
/// alive lets two holders into the critical section.
pub fn cmd_break(args: BreakArgs, config: &Config) -> Result<()> {
    if !args.force {
        return Err(LockfileError::UserError(format!(
            "refusing to break lock without --force flag.\n\n\
             Breaking a lock lets another holder in while the current one may still be active.\n\
             Only break locks if you are certain the lock holder has crashed.\n\n\
             To break the lock, run:\n  lockfile break {} --force",
            args.path.display()
        )));
    }

    let mut lock = FileLock::from_config(&args.path, config)?;
    let info = lock.info();
    if !info.state.is_locked() {
        println!("Not locked: {}", info.path.display());
        return Ok(());
    }

    lock.break_lock();
    if lock.is_locked() {
        return Err(LockfileError::UserError(format!(
            "lock on '{}' is still held after breaking it",
            info.path.display()
        )));
    }

    println!("Broke lock: {}", info.path.display());
    println!();
    println!("Lock details:");
    println!("  Backend:    {}", info.backend);
    println!("  Artifact:   {}", info.artifact.display());
    if let Some(holder) = &info.holder {
        println!("  Holder:     {}", holder);
    }
    if let Some(modified) = info.modified {
        println!("  Created:    {}", modified.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(age) = info.age_string() {
        println!("  Age:        {}", age);
    }
    Ok(())
}
