//! Lockfile: advisory, cross-process locks on filesystem paths.
//!
//! A [`FileLock`] names a resource path and claims it with one of four
//! backends ([`BackendKind`]). Holders are identified by hostname, pid and an
//! optional thread tag ([`HolderIdentity`]).
//!
//! ```no_run
//! use lockfile::{FileLock, HolderIdentity};
//! use std::time::Duration;
//!
//! # fn main() -> lockfile::Result<()> {
//! let mut lock = FileLock::new("/tmp/resource", HolderIdentity::current(true))?;
//! lock.acquire(Some(Duration::from_secs(5)))?;
//! // ... work on the resource ...
//! lock.release()?;
//! # Ok(())
//! # }
//! ```
//!
//! Locks are advisory: they only exclude other processes that use them too.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod identity;
pub mod locks;

pub use config::Config;
pub use error::{LockfileError, Result};
pub use identity::HolderIdentity;
pub use locks::{BackendKind, FileLock, LockGuard, LockInfo, LockState, PollPolicy};
