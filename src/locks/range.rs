//! Kernel advisory lock backend.
//!
//! Uses `fs2` (flock on Unix, LockFileEx on Windows) to take an exclusive
//! lock covering the file opened at the resource path. There is no separate
//! artifact: the kernel drops the lock when the descriptor is closed or the
//! process dies, so a crashed holder never leaves a stale lock behind.
//!
//! The locked range is the whole file: `fs2` has no byte-range API, so the
//! lock covers every byte of the resource whatever its length.
//!
//! Lock state belongs to the open descriptor, so ownership is per `FileLock`
//! object rather than per holder identity. `is_locked` probes by briefly
//! taking the lock on a second descriptor.

use super::backend::{ClaimAttempt, ClaimStrategy};
use super::types::BackendKind;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct RangeClaim {
    path: PathBuf,
    file: Option<File>,
}

impl RangeClaim {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: None,
        }
    }

    /// Open the resource for locking. Append mode never clobbers contents
    /// the caller keeps in the file.
    fn open(&self) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
    }
}

fn is_contention(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl ClaimStrategy for RangeClaim {
    fn kind(&self) -> BackendKind {
        BackendKind::Range
    }

    fn artifact_path(&self) -> &Path {
        &self.path
    }

    fn try_claim(&mut self) -> io::Result<ClaimAttempt> {
        if self.file.is_some() {
            return Ok(ClaimAttempt::Acquired);
        }

        let file = self.open()?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                self.file = Some(file);
                Ok(ClaimAttempt::Acquired)
            }
            Err(e) if is_contention(&e) => Ok(ClaimAttempt::Contended),
            Err(e) => Err(e),
        }
    }

    fn is_locked(&self) -> bool {
        if self.file.is_some() {
            return true;
        }

        let Ok(probe) = File::open(&self.path) else {
            return false;
        };
        match probe.try_lock_exclusive() {
            Ok(()) => {
                let _ = FileExt::unlock(&probe);
                false
            }
            Err(e) => is_contention(&e),
        }
    }

    fn i_am_locking(&self) -> bool {
        self.file.is_some()
    }

    fn remove_claim(&mut self) -> io::Result<()> {
        match self.file.take() {
            // Closing the descriptor releases the lock even if unlock fails.
            Some(file) => FileExt::unlock(&file),
            None => Ok(()),
        }
    }

    fn break_claim(&mut self) -> io::Result<()> {
        // Another descriptor's kernel lock cannot be revoked from here; only
        // a lock held through this object can be dropped.
        if self.file.is_some() {
            self.remove_claim()?;
        } else {
            tracing::debug!(
                path = %self.path.display(),
                "range lock held elsewhere is released only by its holder"
            );
        }
        Ok(())
    }

    fn holder(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn claim_creates_file_and_holds_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("res");
        let mut claim = RangeClaim::new(&path);

        assert_eq!(claim.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert!(path.exists());
        assert!(claim.i_am_locking());
        assert!(claim.is_locked());
    }

    #[test]
    fn second_descriptor_is_contended() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("res");
        let mut first = RangeClaim::new(&path);
        let mut second = RangeClaim::new(&path);

        first.try_claim().unwrap();
        assert!(second.is_locked());
        assert!(!second.i_am_locking());
        assert_eq!(second.try_claim().unwrap(), ClaimAttempt::Contended);

        first.remove_claim().unwrap();
        assert!(!second.is_locked());
        assert_eq!(second.try_claim().unwrap(), ClaimAttempt::Acquired);
    }

    #[test]
    fn dropping_holder_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("res");

        {
            let mut crashed = RangeClaim::new(&path);
            crashed.try_claim().unwrap();
        }

        let mut next = RangeClaim::new(&path);
        assert!(!next.is_locked());
        assert_eq!(next.try_claim().unwrap(), ClaimAttempt::Acquired);
    }

    #[test]
    fn file_contents_survive_locking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("res");
        std::fs::write(&path, "keep me").unwrap();

        let mut claim = RangeClaim::new(&path);
        claim.try_claim().unwrap();
        claim.remove_claim().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn missing_file_is_unlocked() {
        let temp_dir = TempDir::new().unwrap();
        let claim = RangeClaim::new(&temp_dir.path().join("absent"));
        assert!(!claim.is_locked());
    }
}
