//! Scoped acquisition.

use super::lock::FileLock;
use crate::error::Result;
use std::ops::{Deref, DerefMut};

/// RAII guard for an acquired lock.
///
/// Dropping the guard releases the lock, including while unwinding from a
/// panic. A release failure on drop can only be logged; call
/// [`LockGuard::release`] to see it.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a mut FileLock,
    released: bool,
}

impl<'a> LockGuard<'a> {
    pub(super) fn new(lock: &'a mut FileLock) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Release the lock now, returning any `NotLocked` / `NotMyLock` error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl Deref for LockGuard<'_> {
    type Target = FileLock;

    fn deref(&self) -> &FileLock {
        self.lock
    }
}

impl DerefMut for LockGuard<'_> {
    fn deref_mut(&mut self) -> &mut FileLock {
        self.lock
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release()
        {
            tracing::warn!(
                path = %self.lock.path().display(),
                error = %e,
                "failed to release lock on scope exit"
            );
        }
    }
}

impl FileLock {
    /// Acquire the lock, waiting as long as it takes, and return a guard
    /// that releases it.
    pub fn lock(&mut self) -> Result<LockGuard<'_>> {
        self.acquire(None)?;
        Ok(LockGuard::new(self))
    }

    /// Run `f` while holding the lock.
    ///
    /// The lock is released on every exit path. A failed release after `f`
    /// returns is reported as the error.
    pub fn with_lock<T>(&mut self, f: impl FnOnce(&mut FileLock) -> T) -> Result<T> {
        let mut guard = self.lock()?;
        let output = f(&mut *guard);
        guard.release()?;
        Ok(output)
    }
}
