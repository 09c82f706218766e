//! Tests for config functionality.

use crate::config::Config;
use crate::locks::{BackendKind, PollPolicy};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.backend, BackendKind::platform_default());
    assert!(config.threaded);
    assert_eq!(config.timeout_secs, None);
    assert_eq!(config.poll_interval_ms, 100);
    assert_eq!(config.min_poll_interval_ms, 10);
    assert_eq!(config.stale_minutes, 120);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let yaml = "";
    let config = Config::from_yaml(yaml).unwrap();

    // Should use all defaults
    assert_eq!(config.backend, BackendKind::platform_default());
    assert!(config.threaded);
    assert_eq!(config.poll_interval_ms, 100);
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
backend: mkdir
timeout_secs: 2.5
"#;
    let config = Config::from_yaml(yaml).unwrap();

    // Specified values should be used
    assert_eq!(config.backend, BackendKind::Mkdir);
    assert_eq!(config.timeout_secs, Some(2.5));

    // Unspecified values should use defaults
    assert!(config.threaded);
    assert_eq!(config.stale_minutes, 120);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
backend: pidfile
threaded: false
timeout_secs: 0.0
poll_interval_ms: 250
min_poll_interval_ms: 25
stale_minutes: 30
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.backend, BackendKind::PidFile);
    assert!(!config.threaded);
    assert_eq!(config.timeout_secs, Some(0.0));
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(config.min_poll_interval_ms, 25);
    assert_eq!(config.stale_minutes, 30);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
backend: range
some_future_field: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.backend, BackendKind::Range);
}

#[test]
fn test_unknown_backend_rejected() {
    let result = Config::from_yaml("backend: flock\n");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("failed to parse"));
}

#[test]
fn test_validation_zero_poll_interval() {
    let result = Config::from_yaml("poll_interval_ms: 0\n");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("greater than 0"));
}

#[test]
fn test_validation_floor_above_interval() {
    let yaml = r#"
poll_interval_ms: 50
min_poll_interval_ms: 60
"#;
    let result = Config::from_yaml(yaml);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("must not exceed poll_interval_ms")
    );
}

#[test]
fn test_validation_zero_stale_minutes() {
    let config = Config {
        stale_minutes: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_non_finite_timeout() {
    let config = Config {
        timeout_secs: Some(f64::NAN),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_acquire_timeout() {
    let mut config = Config::default();
    assert_eq!(config.acquire_timeout(), None);

    config.timeout_secs = Some(1.5);
    assert_eq!(config.acquire_timeout(), Some(Duration::from_millis(1500)));

    // Zero and negative both mean a single attempt
    config.timeout_secs = Some(0.0);
    assert_eq!(config.acquire_timeout(), Some(Duration::ZERO));
    config.timeout_secs = Some(-3.0);
    assert_eq!(config.acquire_timeout(), Some(Duration::ZERO));
}

#[test]
fn test_poll_policy() {
    let config = Config::default();
    assert_eq!(config.poll_policy(), PollPolicy::default());

    let config = Config {
        poll_interval_ms: 40,
        min_poll_interval_ms: 5,
        ..Config::default()
    };
    let poll = config.poll_policy();
    assert_eq!(poll.interval, Duration::from_millis(40));
    assert_eq!(poll.min_interval, Duration::from_millis(5));
}

#[test]
fn test_roundtrip_yaml() {
    let original = Config {
        backend: BackendKind::Mkdir,
        timeout_secs: Some(3.0),
        stale_minutes: 45,
        ..Config::default()
    };
    let yaml = original.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();

    assert_eq!(parsed.backend, BackendKind::Mkdir);
    assert_eq!(parsed.timeout_secs, Some(3.0));
    assert_eq!(parsed.stale_minutes, 45);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lockfile.yaml");
    std::fs::write(&path, "backend: mkdir\nthreaded: false\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.backend, BackendKind::Mkdir);
    assert!(!config.threaded);
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::load(temp_dir.path().join("missing.yaml"));
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("failed to read config file")
    );
}

#[test]
fn test_validation_timeout_too_large() {
    let config = Config {
        timeout_secs: Some(1e30),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("too large"));

    let result = Config::from_yaml("timeout_secs: 1.0e30\n");
    assert!(result.is_err());

    // Hugely negative still means a single attempt
    let config = Config {
        timeout_secs: Some(-1e30),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.acquire_timeout(), Some(Duration::ZERO));
}

#[test]
fn test_acquire_timeout_saturates_without_validation() {
    let config = Config {
        timeout_secs: Some(1e30),
        ..Config::default()
    };
    assert_eq!(config.acquire_timeout(), Some(Duration::MAX));
}
