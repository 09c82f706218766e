//! Backend and state definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which atomic filesystem primitive a lock is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Hard link from a holder-unique file to `<path>.lock` (Unix only).
    Link,
    /// Directory creation at `<path>.lock`.
    Mkdir,
    /// Exclusive creation of `<path>` holding the holder's pid.
    #[serde(rename = "pidfile")]
    PidFile,
    /// Kernel advisory lock on an open descriptor to `<path>`.
    Range,
}

impl BackendKind {
    /// Every backend, in preference order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Link,
        BackendKind::Mkdir,
        BackendKind::PidFile,
        BackendKind::Range,
    ];

    /// Get the config/CLI name for this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Link => "link",
            BackendKind::Mkdir => "mkdir",
            BackendKind::PidFile => "pidfile",
            BackendKind::Range => "range",
        }
    }

    /// Parse a backend from its config/CLI name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "link" => Some(Self::Link),
            "mkdir" => Some(Self::Mkdir),
            "pidfile" => Some(Self::PidFile),
            "range" => Some(Self::Range),
            _ => None,
        }
    }

    /// Whether this platform supports the backend.
    pub fn is_available(&self) -> bool {
        match self {
            BackendKind::Link => cfg!(unix),
            BackendKind::Mkdir | BackendKind::PidFile | BackendKind::Range => true,
        }
    }

    /// The preferred backend for this platform: hard links where the
    /// platform has them, directories otherwise.
    pub fn platform_default() -> Self {
        Self::ALL
            .into_iter()
            .find(BackendKind::is_available)
            .unwrap_or(BackendKind::Mkdir)
    }

    /// Backends usable on this platform.
    pub fn available() -> impl Iterator<Item = BackendKind> {
        Self::ALL.into_iter().filter(BackendKind::is_available)
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock state as observed through the claim artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    LockedByMe,
    LockedByOther,
}

impl LockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Unlocked => "unlocked",
            LockState::LockedByMe => "locked by me",
            LockState::LockedByOther => "locked by other",
        }
    }

    pub fn is_locked(&self) -> bool {
        !matches!(self, LockState::Unlocked)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
