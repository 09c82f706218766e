//! Lock snapshots for diagnostics.

use super::types::{BackendKind, LockState};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Point-in-time view of a lock, as seen by one `FileLock`.
///
/// Reporting only: staleness is never acted on automatically.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The resource path.
    pub path: PathBuf,

    /// The claim artifact path.
    pub artifact: PathBuf,

    /// The backend in use.
    pub backend: BackendKind,

    /// Observed state.
    pub state: LockState,

    /// Recorded holder of the claim (unique name or pid), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// When the claim artifact was created or last touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl LockInfo {
    /// Age of the claim artifact.
    pub fn age(&self) -> Option<Duration> {
        self.modified
            .map(|modified| Utc::now().signed_duration_since(modified))
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> Option<String> {
        let age = self.age()?;
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        Some(if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        })
    }

    /// Whether the claim is older than `stale_minutes`.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age()
            .is_some_and(|age| age.num_minutes() > i64::from(stale_minutes))
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.path.display(),
            self.backend,
            self.state
        )?;
        if let Some(holder) = &self.holder {
            write!(f, " (holder: {}", holder)?;
            if let Some(age) = self.age_string() {
                write!(f, ", age: {}", age)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
