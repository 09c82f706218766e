//! Filesystem helpers shared by the lock backends.
//!
//! Claim artifacts are created and removed with single atomic syscalls; the
//! helpers here treat "already gone" as success and read artifact metadata.

mod remove;

pub use remove::{
    entry_exists, modified_at, remove_dir_if_exists, remove_file_if_exists, sync_parent_dir,
};
