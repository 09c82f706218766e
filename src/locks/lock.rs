//! The lock state machine shared by every backend.

use super::backend::{ClaimAttempt, ClaimStrategy, strategy_for};
use super::info::LockInfo;
use super::pidfile::read_pid_from_pidfile;
use super::types::{BackendKind, LockState};
use crate::config::Config;
use crate::error::{LockfileError, Result};
use crate::fs::modified_at;
use crate::identity::HolderIdentity;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Backoff between claim attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between attempts when waiting without a timeout.
    pub interval: Duration,

    /// Shortest sleep between attempts when waiting with a timeout.
    pub min_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            min_interval: Duration::from_millis(10),
        }
    }
}

impl PollPolicy {
    /// Sleep before the next attempt given the time left, if any.
    ///
    /// Bounded waits sleep a tenth of the remaining time, never less than
    /// `min_interval` and never past the deadline.
    pub fn wait_for(&self, remaining: Option<Duration>) -> Duration {
        match remaining {
            None => self.interval,
            Some(remaining) => (remaining / 10).max(self.min_interval).min(remaining),
        }
    }
}

/// An advisory lock on a resource path.
///
/// Holding a `FileLock` does not mean owning the lock. Ownership lives in
/// the claim artifact on disk (or in the kernel for the range backend), and
/// every query reads it afresh.
///
/// The claim artifact must only be touched through `acquire`, `release` and
/// `break_lock`. Creating or deleting it by other means voids the mutual
/// exclusion guarantee.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    identity: HolderIdentity,
    strategy: Box<dyn ClaimStrategy>,
    poll: PollPolicy,
}

impl FileLock {
    /// Lock `path` with the platform's default backend.
    pub fn new(path: impl AsRef<Path>, identity: HolderIdentity) -> Result<Self> {
        Self::with_backend(path, BackendKind::platform_default(), identity)
    }

    /// Lock `path` with a specific backend.
    pub fn with_backend(
        path: impl AsRef<Path>,
        backend: BackendKind,
        identity: HolderIdentity,
    ) -> Result<Self> {
        let path = resolve_resource_path(path.as_ref())?;
        let strategy = strategy_for(backend, &path, &identity)?;
        Ok(Self {
            path,
            identity,
            strategy,
            poll: PollPolicy::default(),
        })
    }

    /// Lock `path` as described by `config`, for the calling process/thread.
    pub fn from_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let identity = HolderIdentity::current(config.threaded);
        let lock = Self::with_backend(path, config.backend, identity)?;
        Ok(lock.with_poll_policy(config.poll_policy()))
    }

    /// Replace the retry backoff.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// The resource path, made absolute.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The claim artifact path.
    pub fn artifact_path(&self) -> &Path {
        self.strategy.artifact_path()
    }

    pub fn backend(&self) -> BackendKind {
        self.strategy.kind()
    }

    pub fn identity(&self) -> &HolderIdentity {
        &self.identity
    }

    /// Acquire the lock.
    ///
    /// * `None`: wait as long as it takes.
    /// * `Some(t)` with `t > 0`: wait up to `t`, then fail with `LockTimeout`.
    /// * `Some(Duration::ZERO)`: try once, failing with `AlreadyLocked`.
    ///
    /// Failures other than contention fail immediately with `LockFailed`.
    /// Acquiring a lock this holder already owns succeeds without counting.
    pub fn acquire(&mut self, timeout: Option<Duration>) -> Result<()> {
        // A deadline past what `Instant` can represent is no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.strategy.try_claim() {
                Ok(ClaimAttempt::Acquired) => {
                    debug!(
                        path = %self.path.display(),
                        backend = %self.backend(),
                        holder = %self.identity,
                        attempt,
                        "acquired lock"
                    );
                    return Ok(());
                }
                Ok(ClaimAttempt::Contended) => {}
                Err(source) => {
                    self.strategy.abandon();
                    return Err(LockfileError::LockFailed {
                        path: self.path.clone(),
                        source,
                    });
                }
            }

            let remaining = match deadline {
                None => None,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        self.strategy.abandon();
                        return Err(self.contention_error(timeout));
                    }
                    Some(deadline - now)
                }
            };

            let wait = self.poll.wait_for(remaining);
            trace!(
                path = %self.path.display(),
                attempt,
                wait_ms = wait.as_millis() as u64,
                "lock contended, retrying"
            );
            thread::sleep(wait);
        }
    }

    /// Make a single acquisition attempt.
    pub fn try_acquire(&mut self) -> Result<()> {
        self.acquire(Some(Duration::ZERO))
    }

    fn contention_error(&self, timeout: Option<Duration>) -> LockfileError {
        match timeout {
            Some(timeout) if !timeout.is_zero() => LockfileError::LockTimeout {
                path: self.path.clone(),
                timeout,
            },
            _ => LockfileError::AlreadyLocked {
                path: self.path.clone(),
            },
        }
    }

    /// Release a lock this holder owns.
    ///
    /// Fails with `NotLocked` when there is no claim and `NotMyLock` when the
    /// claim belongs to someone else.
    pub fn release(&mut self) -> Result<()> {
        if !self.strategy.is_locked() {
            return Err(LockfileError::NotLocked {
                path: self.path.clone(),
            });
        }
        if !self.strategy.i_am_locking() {
            return Err(LockfileError::NotMyLock {
                path: self.path.clone(),
            });
        }

        self.strategy
            .remove_claim()
            .map_err(|source| LockfileError::UnlockFailed {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), holder = %self.identity, "released lock");
        Ok(())
    }

    /// Whether anyone holds the lock.
    pub fn is_locked(&self) -> bool {
        self.strategy.is_locked()
    }

    /// Whether this holder holds the lock.
    pub fn i_am_locking(&self) -> bool {
        self.strategy.i_am_locking()
    }

    pub fn state(&self) -> LockState {
        if !self.strategy.is_locked() {
            LockState::Unlocked
        } else if self.strategy.i_am_locking() {
            LockState::LockedByMe
        } else {
            LockState::LockedByOther
        }
    }

    /// Remove the lock whoever holds it. Meant for recovering from a holder
    /// that crashed; a missing lock is a no-op.
    pub fn break_lock(&mut self) {
        match self.strategy.break_claim() {
            Ok(()) => debug!(path = %self.path.display(), "broke lock"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to break lock"
            ),
        }
    }

    /// Recorded holder of the current claim.
    pub fn holder(&self) -> Option<String> {
        self.strategy.holder()
    }

    /// Pid recorded by the pidfile backend. Always `None` for other backends.
    pub fn read_pid(&self) -> Option<u32> {
        if self.backend() != BackendKind::PidFile {
            return None;
        }
        read_pid_from_pidfile(self.artifact_path()).ok().flatten()
    }

    /// Snapshot of the lock for diagnostics.
    pub fn info(&self) -> LockInfo {
        let state = self.state();
        let modified = match (state, self.backend()) {
            (LockState::Unlocked, _) | (_, BackendKind::Range) => None,
            _ => modified_at(self.artifact_path()),
        };
        LockInfo {
            path: self.path.clone(),
            artifact: self.artifact_path().to_path_buf(),
            backend: self.backend(),
            state,
            holder: self.holder(),
            modified,
        }
    }
}

fn resolve_resource_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(LockfileError::InvalidPath("path is empty".to_string()));
    }
    let absolute = std::path::absolute(path).map_err(|e| {
        LockfileError::InvalidPath(format!("cannot resolve '{}': {}", path.display(), e))
    })?;
    if absolute.file_name().is_none() {
        return Err(LockfileError::InvalidPath(format!(
            "'{}' does not name a file",
            path.display()
        )));
    }
    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_wait_uses_interval() {
        let poll = PollPolicy::default();
        assert_eq!(poll.wait_for(None), Duration::from_millis(100));
    }

    #[test]
    fn bounded_wait_is_a_tenth_of_remaining() {
        let poll = PollPolicy::default();
        assert_eq!(
            poll.wait_for(Some(Duration::from_secs(2))),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn bounded_wait_has_floor_and_cap() {
        let poll = PollPolicy::default();
        assert_eq!(
            poll.wait_for(Some(Duration::from_millis(50))),
            Duration::from_millis(10)
        );
        assert_eq!(
            poll.wait_for(Some(Duration::from_millis(3))),
            Duration::from_millis(3)
        );
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = resolve_resource_path(Path::new("")).unwrap_err();
        assert!(matches!(err, LockfileError::InvalidPath(_)));
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let resolved = resolve_resource_path(Path::new("some-resource")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some-resource"));
    }
}
