use negotiator_core::{ConfigError, ConfigManager, NegotiatorConfig};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "NEGOTIATOR_CONFIG",
    "NEGOTIATOR_CACHE_TTL_SECS",
    "NEGOTIATOR_HIGH_THRESHOLD",
    "NEGOTIATOR_MAX_STAKEHOLDERS",
    "NEGOTIATOR_LOG_LEVEL",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("negotiator.toml");
    fs::write(
        &path,
        r#"
[cache]
ttl_secs = 120

[scoring]
high_threshold = 0.75

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let manager = ConfigManager::from_file(&path).unwrap();
    let config = manager.config();
    assert_eq!(config.cache.ttl(), Duration::from_secs(120));
    assert_eq!(config.scoring.high_threshold, 0.75);
    assert_eq!(config.scoring.supportive_threshold, 0.3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(manager.config_path(), Some(path.as_path()));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("negotiator.toml");
    fs::write(&path, "[cache]\nttl_secs = 120\n").unwrap();

    std::env::set_var("NEGOTIATOR_CACHE_TTL_SECS", "90");
    std::env::set_var("NEGOTIATOR_MAX_STAKEHOLDERS", "not-a-number");
    let manager = ConfigManager::from_file(&path).unwrap();
    clear_env();

    assert_eq!(manager.config().cache.ttl_secs, 90);
    assert_eq!(manager.config().limits.max_stakeholders, 50);
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("negotiator.toml");
    fs::write(&path, "[scoring]\nsupportive_threshold = -0.6\n").unwrap();

    let err = ConfigManager::from_file(&path).err().unwrap();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
#[serial]
fn test_malformed_toml_is_a_parse_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("negotiator.toml");
    fs::write(&path, "[cache\nttl_secs = ").unwrap();

    let err = ConfigManager::from_file(&path).err().unwrap();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
#[serial]
fn test_missing_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let err = ConfigManager::from_file(&dir.path().join("absent.toml")).err().unwrap();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
#[serial]
fn test_default_config_round_trips_through_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    ConfigManager::create_default_config(&path).unwrap();

    let manager = ConfigManager::from_file(&path).unwrap();
    assert_eq!(manager.config(), &NegotiatorConfig::default());
}

#[test]
#[serial]
fn test_limits_cannot_be_loosened_past_hard_caps() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("negotiator.toml");
    fs::write(&path, "[limits]\nmin_context_chars = 10\n").unwrap();
    let err = ConfigManager::from_file(&path).err().unwrap();
    assert!(matches!(err, ConfigError::ValidationError(_)));

    fs::write(&path, "[limits]\nmax_stakeholders = 20\n").unwrap();
    std::env::set_var("NEGOTIATOR_MAX_STAKEHOLDERS", "10000");
    let result = ConfigManager::from_file(&path);
    clear_env();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    let manager = ConfigManager::from_file(&path).unwrap();
    assert_eq!(manager.config().limits.max_stakeholders, 20);
}
