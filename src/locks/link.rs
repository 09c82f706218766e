//! Hard-link backend.
//!
//! The holder writes a file named after its identity next to the resource,
//! then hard-links it to `<path>.lock`. `link(2)` fails atomically when the
//! target exists, so exactly one holder wins.
//!
//! Ownership is decided by comparing the claim path and the holder file by
//! device and inode. That stays correct when `break_lock` races an acquire:
//! once the claim is removed or replaced, the inodes no longer match and the
//! old holder stops believing it owns the lock.
//!
//! One holder locking several resources in the same directory links every
//! claim to the same holder file. The holder file is therefore removed only
//! once no claim links to it any more.

use super::backend::{ClaimAttempt, ClaimStrategy, claim_path_for};
use super::types::BackendKind;
use crate::fs::{entry_exists, remove_file_if_exists, sync_parent_dir};
use crate::identity::HolderIdentity;
use std::ffi::OsStr;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct LinkClaim {
    claim_path: PathBuf,
    unique_path: PathBuf,
    unique_name: String,
}

impl LinkClaim {
    pub fn new(resource: &Path, identity: &HolderIdentity) -> Self {
        let claim_path = claim_path_for(resource);
        let dir = claim_path.parent().unwrap_or(Path::new("."));
        let unique_name = identity.unique_name();
        Self {
            unique_path: dir.join(&unique_name),
            claim_path,
            unique_name,
        }
    }

    /// Make sure the holder file exists. Its contents name the holder so
    /// anyone reading the claim path can tell who owns it.
    ///
    /// A holder file already linked to a claim is left untouched, so the
    /// claim keeps its contents and its mtime.
    fn ensure_unique_file(&self) -> io::Result<()> {
        match fs::symlink_metadata(&self.unique_path) {
            Ok(meta) if meta.nlink() > 1 => return Ok(()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.unique_path)?;
        writeln!(file, "{}", self.unique_name)
    }

    /// Remove the holder file unless a claim still links to it.
    fn remove_unlinked_unique_file(&self) -> io::Result<()> {
        remove_if_unlinked(&self.unique_path, None)
    }
}

fn same_inode(a: &Metadata, b: &Metadata) -> bool {
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Remove `path` if it is the only name of its inode, and, when `inode` is
/// given, only if it is that inode.
fn remove_if_unlinked(path: &Path, inode: Option<&Metadata>) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if meta.nlink() > 1 || inode.is_some_and(|inode| !same_inode(&meta, inode)) {
        return Ok(());
    }
    remove_file_if_exists(path).map(|_| ())
}

impl ClaimStrategy for LinkClaim {
    fn kind(&self) -> BackendKind {
        BackendKind::Link
    }

    fn artifact_path(&self) -> &Path {
        &self.claim_path
    }

    fn try_claim(&mut self) -> io::Result<ClaimAttempt> {
        let mut retried = false;
        loop {
            self.ensure_unique_file()?;

            match fs::hard_link(&self.unique_path, &self.claim_path) {
                Ok(()) => {
                    sync_parent_dir(&self.claim_path);
                    return Ok(ClaimAttempt::Acquired);
                }
                // The claim exists. It is ours when both names share an inode,
                // e.g. a second acquire from the same holder.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Ok(if self.i_am_locking() {
                        ClaimAttempt::Acquired
                    } else {
                        ClaimAttempt::Contended
                    });
                }
                // Another claim of this holder released the shared holder
                // file between the two steps; recreate it once.
                Err(e)
                    if e.kind() == io::ErrorKind::NotFound
                        && !retried
                        && !entry_exists(&self.unique_path)
                        && self.claim_path.parent().is_some_and(Path::is_dir) =>
                {
                    retried = true;
                }
                Err(e) => {
                    let _ = self.remove_unlinked_unique_file();
                    return Err(e);
                }
            }
        }
    }

    fn abandon(&mut self) {
        if !self.i_am_locking() {
            let _ = self.remove_unlinked_unique_file();
        }
    }

    fn is_locked(&self) -> bool {
        entry_exists(&self.claim_path)
    }

    fn i_am_locking(&self) -> bool {
        match (
            fs::symlink_metadata(&self.claim_path),
            fs::symlink_metadata(&self.unique_path),
        ) {
            (Ok(claim), Ok(unique)) => same_inode(&claim, &unique) && unique.nlink() >= 2,
            _ => false,
        }
    }

    fn remove_claim(&mut self) -> io::Result<()> {
        // Claim first: a crash in between leaks only the holder file, which
        // blocks nobody.
        remove_file_if_exists(&self.claim_path)?;
        self.remove_unlinked_unique_file()
    }

    fn break_claim(&mut self) -> io::Result<()> {
        let claim = match fs::symlink_metadata(&self.claim_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        // The claim names its holder file. Other claims of the same holder
        // may still link to it, in which case it stays.
        let holder_path = self
            .holder()
            .filter(|name| Path::new(name).file_name() == Some(OsStr::new(name.as_str())))
            .and_then(|name| self.claim_path.parent().map(|dir| dir.join(name)));

        remove_file_if_exists(&self.claim_path)?;
        if let Some(holder_path) = holder_path {
            remove_if_unlinked(&holder_path, Some(&claim))?;
        }
        Ok(())
    }

    fn holder(&self) -> Option<String> {
        fs::read_to_string(&self.claim_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn claim_in(dir: &TempDir, pid: u32) -> LinkClaim {
        let id = HolderIdentity::new("host", pid, None);
        LinkClaim::new(&dir.path().join("res"), &id)
    }

    #[test]
    fn holder_file_sits_next_to_resource() {
        let temp_dir = TempDir::new().unwrap();
        let claim = claim_in(&temp_dir, 7);
        assert_eq!(claim.unique_path, temp_dir.path().join("host.7"));
        assert_eq!(claim.artifact_path(), temp_dir.path().join("res.lock"));
    }

    #[test]
    fn claim_links_holder_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut claim = claim_in(&temp_dir, 7);

        assert_eq!(claim.try_claim().unwrap(), ClaimAttempt::Acquired);
        let meta = fs::metadata(&claim.unique_path).unwrap();
        assert_eq!(meta.nlink(), 2);
        assert_eq!(claim.holder().as_deref(), Some("host.7"));
    }

    #[test]
    fn second_claim_by_same_holder_is_acquired() {
        let temp_dir = TempDir::new().unwrap();
        let mut claim = claim_in(&temp_dir, 7);

        assert_eq!(claim.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert_eq!(claim.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert_eq!(fs::metadata(&claim.unique_path).unwrap().nlink(), 2);
    }

    #[test]
    fn other_holder_is_contended_and_abandon_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = claim_in(&temp_dir, 7);
        let mut second = claim_in(&temp_dir, 8);

        assert_eq!(first.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert_eq!(second.try_claim().unwrap(), ClaimAttempt::Contended);
        assert!(second.unique_path.exists());

        second.abandon();
        assert!(!second.unique_path.exists());
        assert!(first.i_am_locking());
    }

    #[test]
    fn break_removes_claim_and_holder_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = claim_in(&temp_dir, 7);
        let mut second = claim_in(&temp_dir, 8);

        first.try_claim().unwrap();
        second.break_claim().unwrap();

        assert!(!first.is_locked());
        assert!(!first.unique_path.exists());
        // Breaking again is a no-op.
        second.break_claim().unwrap();
    }

    #[test]
    fn stale_holder_file_is_not_ownership() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = claim_in(&temp_dir, 7);
        let mut second = claim_in(&temp_dir, 8);

        first.try_claim().unwrap();
        // Claim replaced behind the first holder's back.
        fs::remove_file(first.artifact_path()).unwrap();
        assert_eq!(second.try_claim().unwrap(), ClaimAttempt::Acquired);

        assert!(!first.i_am_locking());
        assert!(second.i_am_locking());
    }

    fn claim_on(dir: &TempDir, resource: &str, pid: u32) -> LinkClaim {
        let id = HolderIdentity::new("host", pid, None);
        LinkClaim::new(&dir.path().join(resource), &id)
    }

    #[test]
    fn releasing_one_claim_keeps_sibling_claim_of_same_holder() {
        let temp_dir = TempDir::new().unwrap();
        let mut a = claim_on(&temp_dir, "a", 7);
        let mut b = claim_on(&temp_dir, "b", 7);

        assert_eq!(a.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert_eq!(b.try_claim().unwrap(), ClaimAttempt::Acquired);
        assert_eq!(fs::metadata(&a.unique_path).unwrap().nlink(), 3);

        a.remove_claim().unwrap();
        assert!(!a.is_locked());
        assert!(b.i_am_locking());
        assert!(b.unique_path.exists());

        b.remove_claim().unwrap();
        assert!(!b.is_locked());
        assert!(!b.unique_path.exists());
    }

    #[test]
    fn contended_sibling_abandon_keeps_held_claim() {
        let temp_dir = TempDir::new().unwrap();
        let mut foreign = claim_on(&temp_dir, "b", 8);
        let mut a = claim_on(&temp_dir, "a", 7);
        let mut b = claim_on(&temp_dir, "b", 7);

        foreign.try_claim().unwrap();
        a.try_claim().unwrap();
        assert_eq!(b.try_claim().unwrap(), ClaimAttempt::Contended);
        b.abandon();

        assert!(a.i_am_locking());
        a.remove_claim().unwrap();
        assert!(!a.is_locked());
        assert!(foreign.i_am_locking());
    }

    #[test]
    fn break_keeps_holder_file_shared_with_other_claim() {
        let temp_dir = TempDir::new().unwrap();
        let mut a = claim_on(&temp_dir, "a", 7);
        let mut b = claim_on(&temp_dir, "b", 7);
        let mut breaker = claim_on(&temp_dir, "b", 9);

        a.try_claim().unwrap();
        b.try_claim().unwrap();
        breaker.break_claim().unwrap();

        assert!(!b.is_locked());
        assert!(a.i_am_locking());
        a.remove_claim().unwrap();
        assert!(!a.unique_path.exists());
    }

    #[test]
    fn reacquire_leaves_claim_contents_alone() {
        let temp_dir = TempDir::new().unwrap();
        let mut claim = claim_in(&temp_dir, 7);

        claim.try_claim().unwrap();
        // Rewriting the claim would truncate this marker.
        fs::write(&claim.claim_path, "marker\n").unwrap();
        assert_eq!(claim.try_claim().unwrap(), ClaimAttempt::Acquired);

        assert_eq!(claim.holder().as_deref(), Some("marker"));
    }
}
