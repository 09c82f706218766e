//! Locking subsystem.
//!
//! A [`FileLock`] guards a resource path using one of four backends, each
//! built on a single atomic filesystem primitive:
//!
//! | Backend   | Claim artifact                  | Atomic step                   |
//! |-----------|---------------------------------|-------------------------------|
//! | `link`    | hard link `<path>.lock`         | `link(2)` of a holder file    |
//! | `mkdir`   | directory `<path>.lock`         | `mkdir(2)`                    |
//! | `pidfile` | `<path>` containing the pid     | exclusive create              |
//! | `range`   | none (kernel lock on `<path>`)  | exclusive advisory lock       |
//!
//! # States
//!
//! A lock is `Unlocked`, `LockedByMe` or `LockedByOther`, always read from
//! the artifact itself. `acquire` moves Unlocked to LockedByMe, `release`
//! moves LockedByMe to Unlocked, `break_lock` moves anything to Unlocked.
//!
//! # Staleness
//!
//! A crashed holder leaves its link, directory or pidfile behind until
//! someone calls `break_lock`. Range locks are dropped by the kernel when
//! the holder exits.
//!
//! # Scoped use
//!
//! [`FileLock::lock`] returns a [`LockGuard`] that releases on drop, and
//! [`FileLock::with_lock`] runs a closure under the lock.

mod backend;
mod guard;
mod info;
#[cfg(unix)]
mod link;
mod lock;
mod mkdir;
mod pidfile;
mod range;
mod types;


// Re-export public API
pub use backend::{ClaimAttempt, ClaimStrategy, claim_path_for};
pub use guard::LockGuard;
pub use info::LockInfo;
pub use lock::{FileLock, PollPolicy};
pub use pidfile::{read_pid_from_pidfile, remove_existing_pidfile, write_pid_to_pidfile};
pub use types::{BackendKind, LockState};
