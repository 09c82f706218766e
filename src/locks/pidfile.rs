//! PID file backend.
//!
//! The resource path itself is the claim: it is created with exclusive-create
//! semantics and holds the holder's process id followed by a newline.
//!
//! Only the pid is recorded, so ownership is process-scoped whatever the
//! holder's thread tag. A pidfile naming a dead process is not treated as
//! stale; use `break_lock` to clear it.

use super::backend::{ClaimAttempt, ClaimStrategy};
use super::types::BackendKind;
use crate::fs::{entry_exists, remove_file_if_exists, sync_parent_dir};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PidFileClaim {
    path: PathBuf,
    pid: u32,
}

impl PidFileClaim {
    pub fn new(path: &Path, pid: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            pid,
        }
    }
}

/// Read the pid recorded in a pidfile.
///
/// Returns `Ok(None)` when the file does not exist or its first line is not
/// a decimal pid.
pub fn read_pid_from_pidfile(path: &Path) -> io::Result<Option<u32>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(content
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<u32>().ok()))
}

/// Exclusively create a pidfile containing `pid`.
///
/// Fails with `AlreadyExists` if the file is present. A partially written
/// file is removed before the error is returned.
pub fn write_pid_to_pidfile(path: &Path, pid: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    let written = writeln!(file, "{}", pid).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = remove_file_if_exists(path);
        return Err(e);
    }
    sync_parent_dir(path);
    Ok(())
}

/// Remove a pidfile. A missing file is not an error.
pub fn remove_existing_pidfile(path: &Path) -> io::Result<()> {
    remove_file_if_exists(path).map(|_| ())
}

impl ClaimStrategy for PidFileClaim {
    fn kind(&self) -> BackendKind {
        BackendKind::PidFile
    }

    fn artifact_path(&self) -> &Path {
        &self.path
    }

    fn try_claim(&mut self) -> io::Result<ClaimAttempt> {
        match write_pid_to_pidfile(&self.path, self.pid) {
            Ok(()) => Ok(ClaimAttempt::Acquired),
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
        entry_exists(&self.path)
    }

    fn i_am_locking(&self) -> bool {
        matches!(read_pid_from_pidfile(&self.path), Ok(Some(pid)) if pid == self.pid)
    }

    fn remove_claim(&mut self) -> io::Result<()> {
        remove_existing_pidfile(&self.path)
    }

    fn break_claim(&mut self) -> io::Result<()> {
        remove_existing_pidfile(&self.path)
    }

    fn holder(&self) -> Option<String> {
        read_pid_from_pidfile(&self.path)
            .ok()
            .flatten()
            .map(|pid| pid.to_string())
    }
}
