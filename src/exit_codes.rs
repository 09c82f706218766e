//! Exit code constants for the lockfile CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Lock busy (already locked or timed out)
//! - 3: Lock failure (the lock can never be taken as things stand)
//! - 4: Unlock failure (not locked, not ours, or removal failed)
//!
//! `lockfile exec` exits with the child's own status instead.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Lock busy: another holder has it, trying later may succeed.
pub const LOCK_BUSY: i32 = 2;

/// Lock failure: permissions, missing directory, disk exhaustion.
pub const LOCK_FAILURE: i32 = 3;

/// Unlock failure: the lock was not ours to release.
pub const UNLOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, LOCK_BUSY, LOCK_FAILURE, UNLOCK_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
