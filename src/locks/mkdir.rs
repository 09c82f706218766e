//! Directory backend.
//!
//! `mkdir(2)` on `<path>.lock` is atomic and fails when the directory
//! exists. The winner drops an empty file named after its identity inside
//! the directory to record ownership.

use super::backend::{ClaimAttempt, ClaimStrategy, claim_path_for};
use super::types::BackendKind;
use crate::fs::{entry_exists, remove_dir_if_exists, remove_file_if_exists, sync_parent_dir};
use crate::identity::HolderIdentity;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct MkdirClaim {
    claim_path: PathBuf,
    unique_path: PathBuf,
}

impl MkdirClaim {
    pub fn new(resource: &Path, identity: &HolderIdentity) -> Self {
        let claim_path = claim_path_for(resource);
        Self {
            unique_path: claim_path.join(identity.unique_name()),
            claim_path,
        }
    }
}

impl ClaimStrategy for MkdirClaim {
    fn kind(&self) -> BackendKind {
        BackendKind::Mkdir
    }

    fn artifact_path(&self) -> &Path {
        &self.claim_path
    }

    fn try_claim(&mut self) -> io::Result<ClaimAttempt> {
        match fs::create_dir(&self.claim_path) {
            Ok(()) => {
                if let Err(e) = File::create(&self.unique_path) {
                    let _ = remove_dir_if_exists(&self.claim_path);
                    return Err(e);
                }
                sync_parent_dir(&self.claim_path);
                Ok(ClaimAttempt::Acquired)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if self.i_am_locking() {
                    Ok(ClaimAttempt::Acquired)
                } else {
                    Ok(ClaimAttempt::Contended)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn is_locked(&self) -> bool {
        entry_exists(&self.claim_path)
    }

    fn i_am_locking(&self) -> bool {
        entry_exists(&self.unique_path)
    }

    fn remove_claim(&mut self) -> io::Result<()> {
        remove_file_if_exists(&self.unique_path)?;
        remove_dir_if_exists(&self.claim_path)?;
        Ok(())
    }

    fn break_claim(&mut self) -> io::Result<()> {
        let entries = match fs::read_dir(&self.claim_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        for entry in entries {
            remove_file_if_exists(&entry?.path())?;
        }
        remove_dir_if_exists(&self.claim_path)?;
        Ok(())
    }

    fn holder(&self) -> Option<String> {
        fs::read_dir(&self.claim_path)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .next()
    }
}
