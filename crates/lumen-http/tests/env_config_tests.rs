//! Integration tests for environment-based configuration

use lumen_http::{ConfigError, HttpConfigBuilder};
use serial_test::serial;
use std::env;
use std::path::Path;

const LUMEN_VARS: &[&str] = &[
    "LUMEN_PORT",
    "LUMEN_REQUEST_TIMEOUT_SECS",
    "LUMEN_MAX_BODY_SIZE",
    "LUMEN_ENABLE_CORS",
    "LUMEN_MAX_ITERATIONS",
    "LUMEN_SITE_CONFIG",
    "LUMEN_DASHBOARDS_DIR",
    "LUMEN_USAGE_LOG_CAPACITY",
    "LUMEN_CONVERSATION_CAPACITY",
];

fn set_env(key: &str, value: &str) {
    unsafe {
        env::set_var(key, value);
    }
}

fn clear_all_lumen_env_vars() {
    for key in LUMEN_VARS {
        unsafe {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_env_config_default_when_no_vars_set() {
    clear_all_lumen_env_vars();

    let config = HttpConfigBuilder::from_env()
        .expect("should load defaults when no env vars set")
        .build()
        .expect("should build valid config");

    assert_eq!(config.port, 3001);
    assert_eq!(config.request_timeout_secs, 120);
    assert_eq!(config.max_iterations, 10);
    assert!(config.enable_cors);
    assert!(config.site_config_path.is_none());
}

#[test]
#[serial]
fn test_env_config_overrides() {
    clear_all_lumen_env_vars();
    set_env("LUMEN_PORT", "8080");
    set_env("LUMEN_MAX_ITERATIONS", "4");
    set_env("LUMEN_ENABLE_CORS", "off");
    set_env("LUMEN_SITE_CONFIG", "/etc/lumen/site.json");
    set_env("LUMEN_USAGE_LOG_CAPACITY", "500");

    let config = HttpConfigBuilder::from_env()
        .expect("should load config")
        .build()
        .expect("should build valid config");

    assert_eq!(config.port, 8080);
    assert_eq!(config.max_iterations, 4);
    assert!(!config.enable_cors);
    assert_eq!(
        config.site_config_path.as_deref(),
        Some(Path::new("/etc/lumen/site.json"))
    );
    assert_eq!(config.usage_log_capacity, 500);

    clear_all_lumen_env_vars();
}

#[test]
#[serial]
fn test_env_config_invalid_number() {
    clear_all_lumen_env_vars();
    set_env("LUMEN_PORT", "not-a-port");

    let err = HttpConfigBuilder::from_env().unwrap_err();
    match err {
        ConfigError::InvalidEnvVar { key, .. } => assert_eq!(key, "LUMEN_PORT"),
        other => panic!("unexpected error: {other}"),
    }

    clear_all_lumen_env_vars();
}

#[test]
#[serial]
fn test_env_config_invalid_bool() {
    clear_all_lumen_env_vars();
    set_env("LUMEN_ENABLE_CORS", "maybe");

    let err = HttpConfigBuilder::from_env().unwrap_err();
    assert!(err.to_string().contains("invalid boolean value 'maybe'"));

    clear_all_lumen_env_vars();
}

#[test]
#[serial]
fn test_env_config_zero_iterations_fails_validation() {
    clear_all_lumen_env_vars();
    set_env("LUMEN_MAX_ITERATIONS", "0");

    let result = HttpConfigBuilder::from_env()
        .expect("parsing succeeds")
        .build();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    clear_all_lumen_env_vars();
}
