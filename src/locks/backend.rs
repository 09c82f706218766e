//! The atomic claim primitive shared by every backend.
//!
//! Each backend performs exactly one atomic filesystem operation per claim
//! attempt. Contention is reported as [`ClaimAttempt::Contended`]; every
//! other failure comes back as an `io::Error` and is never retried.

use super::mkdir::MkdirClaim;
use super::pidfile::PidFileClaim;
use super::range::RangeClaim;
use super::types::BackendKind;
use crate::error::Result;
use crate::identity::HolderIdentity;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use super::link::LinkClaim;

/// Outcome of a single claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimAttempt {
    /// The claim is ours, either just now or from an earlier acquire.
    Acquired,
    /// Another holder owns the claim.
    Contended,
}

/// One backend's atomic claim primitive.
///
/// Implementations never cache ownership: `is_locked` and `i_am_locking`
/// look at the filesystem (or kernel) every time.
pub trait ClaimStrategy: fmt::Debug + Send {
    fn kind(&self) -> BackendKind;

    /// The filesystem object whose existence signals ownership.
    fn artifact_path(&self) -> &Path;

    /// Make one atomic claim attempt.
    fn try_claim(&mut self) -> io::Result<ClaimAttempt>;

    /// Clean up after an acquire that gave up without the claim.
    fn abandon(&mut self) {}

    /// Whether any holder owns the claim.
    fn is_locked(&self) -> bool;

    /// Whether this holder owns the claim.
    fn i_am_locking(&self) -> bool;

    /// Remove a claim this holder owns.
    fn remove_claim(&mut self) -> io::Result<()>;

    /// Remove the claim regardless of owner. Absent claims are not an error.
    fn break_claim(&mut self) -> io::Result<()>;

    /// Recorded holder of the current claim, if the backend records one.
    fn holder(&self) -> Option<String>;
}

/// `<path>.lock`, the shared claim path for the link and mkdir backends.
pub fn claim_path_for(resource: &Path) -> PathBuf {
    let mut name = OsString::from(resource.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Build the claim strategy for `kind`.
pub(crate) fn strategy_for(
    kind: BackendKind,
    resource: &Path,
    identity: &HolderIdentity,
) -> Result<Box<dyn ClaimStrategy>> {
    let strategy: Box<dyn ClaimStrategy> = match kind {
        #[cfg(unix)]
        BackendKind::Link => Box::new(LinkClaim::new(resource, identity)),
        #[cfg(not(unix))]
        BackendKind::Link => {
            return Err(crate::error::LockfileError::UserError(
                "the link backend is not available on this platform".to_string(),
            ));
        }
        BackendKind::Mkdir => Box::new(MkdirClaim::new(resource, identity)),
        BackendKind::PidFile => Box::new(PidFileClaim::new(resource, identity.pid())),
        BackendKind::Range => Box::new(RangeClaim::new(resource)),
    };
    Ok(strategy)
}
