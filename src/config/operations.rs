//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{LockfileError, Result};
use crate::locks::PollPolicy;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockfileError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            LockfileError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockfileError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `backend` must be available on this platform
    /// - `timeout_secs` must be a finite number that fits in a `Duration`
    /// - `poll_interval_ms` and `min_poll_interval_ms` must be positive
    /// - `min_poll_interval_ms` must not exceed `poll_interval_ms`
    /// - `stale_minutes` must be positive
    pub fn validate(&self) -> Result<()> {
        if !self.backend.is_available() {
            return Err(LockfileError::UserError(format!(
                "config validation failed: backend '{}' is not available on this platform",
                self.backend
            )));
        }

        if let Some(timeout) = self.timeout_secs {
            if !timeout.is_finite() {
                return Err(LockfileError::UserError(
                    "config validation failed: timeout_secs must be a finite number".to_string(),
                ));
            }
            if timeout > 0.0 && Duration::try_from_secs_f64(timeout).is_err() {
                return Err(LockfileError::UserError(format!(
                    "config validation failed: timeout_secs ({}) is too large",
                    timeout
                )));
            }
        }

        if self.poll_interval_ms == 0 || self.min_poll_interval_ms == 0 {
            return Err(LockfileError::UserError(
                "config validation failed: poll intervals must be greater than 0".to_string(),
            ));
        }

        if self.min_poll_interval_ms > self.poll_interval_ms {
            return Err(LockfileError::UserError(format!(
                "config validation failed: min_poll_interval_ms ({}) must not exceed poll_interval_ms ({})",
                self.min_poll_interval_ms, self.poll_interval_ms
            )));
        }

        if self.stale_minutes == 0 {
            return Err(LockfileError::UserError(
                "config validation failed: stale_minutes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The acquire timeout: `None` waits forever, zero tries once.
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(seconds_to_timeout)
    }

    /// Retry backoff described by this config.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            min_interval: Duration::from_millis(self.min_poll_interval_ms),
        }
    }
}

/// Signed seconds to a timeout; anything not positive means a single attempt.
/// Values too large for a `Duration` saturate.
fn seconds_to_timeout(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
