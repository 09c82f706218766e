//! Default values for config fields.

use crate::locks::BackendKind;

// Default value functions for serde
pub(crate) fn default_backend() -> BackendKind {
    BackendKind::platform_default()
}
pub(crate) fn default_poll_interval_ms() -> u64 {
    100
}
pub(crate) fn default_min_poll_interval_ms() -> u64 {
    10
}
pub(crate) fn default_stale_minutes() -> u32 {
    120
}
pub(crate) fn default_true() -> bool {
    true
}
