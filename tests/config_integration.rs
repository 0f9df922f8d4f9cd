//! Integration tests for configuration management
//!
//! These tests validate that the configuration system properly reads
//! `ROTATOR_*` environment variables and rejects invalid values.

use oauth_rotator::config::StoreBackend;
use oauth_rotator::{Result, RotatorConfig};
use std::env;
use std::sync::Mutex;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 7] = [
    "ROTATOR_ISSUER_BASE_URL",
    "ROTATOR_PROBE_PATH",
    "ROTATOR_HTTP_TIMEOUT_SECONDS",
    "ROTATOR_HTTP_CONNECT_TIMEOUT_SECONDS",
    "ROTATOR_STORE_BACKEND",
    "ROTATOR_MEMORY_SNAPSHOT",
    "ROTATOR_JSON_LOGGING",
];

/// Run `f` with the given variables set, restoring the environment afterwards.
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let original: Vec<(&str, Option<String>)> =
        VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
    for name in VARS {
        env::remove_var(name);
    }
    for (name, value) in vars {
        env::set_var(name, value);
    }

    let result = f();

    for (name, value) in original {
        match value {
            Some(value) => env::set_var(name, value),
            None => env::remove_var(name),
        }
    }
    result
}

#[test]
fn test_config_defaults_integration() -> Result<()> {
    let config = with_env(&[], RotatorConfig::from_env)?;

    assert_eq!(config.exchange.base_url, "https://api.trakt.tv");
    assert_eq!(config.exchange.probe_path, "/users/me/lists");
    assert_eq!(config.exchange.timeout_seconds, 10);
    assert_eq!(config.store.backend, StoreBackend::Aws);
    assert!(!config.observability.json_logging);
    Ok(())
}

#[test]
fn test_config_environment_integration() -> Result<()> {
    let config = with_env(
        &[
            ("ROTATOR_ISSUER_BASE_URL", "http://127.0.0.1:8089"),
            ("ROTATOR_PROBE_PATH", "/users/settings"),
            ("ROTATOR_HTTP_TIMEOUT_SECONDS", "30"),
            ("ROTATOR_STORE_BACKEND", "memory"),
            ("ROTATOR_MEMORY_SNAPSHOT", "/tmp/secrets.json"),
            ("ROTATOR_JSON_LOGGING", "true"),
        ],
        RotatorConfig::from_env,
    )?;

    assert_eq!(config.exchange.base_url, "http://127.0.0.1:8089");
    assert_eq!(config.exchange.probe_path, "/users/settings");
    assert_eq!(config.exchange.timeout_seconds, 30);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.store.memory_snapshot.as_deref(), Some(std::path::Path::new("/tmp/secrets.json")));
    assert!(config.observability.json_logging);
    Ok(())
}

#[test]
fn test_config_rejects_invalid_values() {
    let cases: [&[(&str, &str)]; 5] = [
        &[("ROTATOR_HTTP_TIMEOUT_SECONDS", "soon")],
        &[("ROTATOR_HTTP_TIMEOUT_SECONDS", "0")],
        &[("ROTATOR_HTTP_TIMEOUT_SECONDS", "2"), ("ROTATOR_HTTP_CONNECT_TIMEOUT_SECONDS", "5")],
        &[("ROTATOR_STORE_BACKEND", "vault")],
        &[("ROTATOR_STORE_BACKEND", "memory")],
    ];

    for vars in cases {
        let result = with_env(vars, RotatorConfig::from_env);
        assert!(result.is_err(), "expected {:?} to be rejected", vars);
    }
}

#[test]
fn test_blank_values_fall_back_to_defaults() -> Result<()> {
    let config = with_env(&[("ROTATOR_PROBE_PATH", "  ")], RotatorConfig::from_env)?;
    assert_eq!(config.exchange.probe_path, "/users/me/lists");
    Ok(())
}
