//! Error types for lockfile.
//!
//! Uses thiserror for derive macros. Acquisition and release failures are
//! distinct variants so callers can tell "busy, try later" apart from
//! "will never succeed without intervention".

use crate::exit_codes;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for lock operations.
#[derive(Error, Debug)]
pub enum LockfileError {
    /// A single acquisition attempt found the resource claimed by another holder.
    #[error("'{}' is already locked", path.display())]
    AlreadyLocked { path: PathBuf },

    /// A bounded acquisition attempt ran out of time while contended.
    #[error("timed out after {:.3}s waiting for lock on '{}'", timeout.as_secs_f64(), path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    /// The claim primitive failed for a reason unrelated to contention.
    #[error("failed to lock '{}': {source}", path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Release was attempted but no claim artifact exists.
    #[error("'{}' is not locked", path.display())]
    NotLocked { path: PathBuf },

    /// Release was attempted on a lock held by a different holder.
    #[error("'{}' is locked by another holder", path.display())]
    NotMyLock { path: PathBuf },

    /// The lock was ours but the claim artifact could not be removed.
    #[error("failed to release lock '{}': {source}", path.display())]
    UnlockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource path cannot be used as a lock target.
    #[error("invalid lock path: {0}")]
    InvalidPath(String),

    /// Bad configuration or arguments.
    #[error("{0}")]
    UserError(String),

    /// A command run under the lock exited unsuccessfully.
    #[error("command exited with status {code}")]
    CommandFailed { code: i32 },
}

impl LockfileError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockfileError::AlreadyLocked { .. } => exit_codes::LOCK_BUSY,
            LockfileError::LockTimeout { .. } => exit_codes::LOCK_BUSY,
            LockfileError::LockFailed { .. } => exit_codes::LOCK_FAILURE,
            LockfileError::NotLocked { .. } => exit_codes::UNLOCK_FAILURE,
            LockfileError::NotMyLock { .. } => exit_codes::UNLOCK_FAILURE,
            LockfileError::UnlockFailed { .. } => exit_codes::UNLOCK_FAILURE,
            LockfileError::InvalidPath(_) => exit_codes::USER_ERROR,
            LockfileError::UserError(_) => exit_codes::USER_ERROR,
            LockfileError::CommandFailed { code } => *code,
        }
    }

    /// Whether waiting and trying again could succeed.
    ///
    /// Only contention is retryable; a `LockFailed` will keep failing until
    /// someone fixes permissions, paths or disk space.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LockfileError::AlreadyLocked { .. } | LockfileError::LockTimeout { .. }
        )
    }
}

/// Result type alias for lock operations.
pub type Result<T> = std::result::Result<T, LockfileError>;
