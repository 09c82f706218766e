//! Not-found tolerant removal and metadata helpers.
//!
//! Removing a claim artifact races with other holders and with `break_lock`,
//! so "already gone" is reported as `Ok(false)` rather than an error.

use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Remove a file, returning whether it existed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove an empty directory, returning whether it existed.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether anything (file, directory, dangling entry) exists at `path`.
///
/// Uses `symlink_metadata` so a hard link or directory is seen without
/// following anything.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Best-effort fsync of the directory containing `path`, so a newly created
/// entry survives a crash.
pub fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

/// Modification time of the entry at `path`, if it exists.
pub fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    fs::symlink_metadata(path)
        .ok()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Utc>::from)
}
