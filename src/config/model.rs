//! Config struct definition and default implementation.

use super::types::*;
use crate::locks::BackendKind;
use serde::{Deserialize, Serialize};

/// Configuration for taking locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Holder settings
    // =========================================================================
    /// Backend used for new locks (default: `link` on Unix, `mkdir` elsewhere).
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Whether each thread is a separate holder (default: true).
    ///
    /// When false, every thread of the process shares one identity.
    #[serde(default = "default_true")]
    pub threaded: bool,

    // =========================================================================
    // Acquire settings
    // =========================================================================
    /// Seconds to wait for the lock. Absent waits forever; zero or negative
    /// tries exactly once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,

    /// Sleep between attempts when waiting forever.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Shortest sleep between attempts when waiting with a timeout.
    #[serde(default = "default_min_poll_interval_ms")]
    pub min_poll_interval_ms: u64,

    // =========================================================================
    // Reporting settings
    // =========================================================================
    /// Age after which `status` flags a claim as stale.
    #[serde(default = "default_stale_minutes")]
    pub stale_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            threaded: default_true(),
            timeout_secs: None,
            poll_interval_ms: default_poll_interval_ms(),
            min_poll_interval_ms: default_min_poll_interval_ms(),
            stale_minutes: default_stale_minutes(),
        }
    }
}
