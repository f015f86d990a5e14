use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Largest stakeholder list any configuration may accept.
pub const STAKEHOLDER_HARD_CAP: usize = 50;

/// Shortest context any configuration may accept.
pub const CONTEXT_HARD_FLOOR: usize = 50;

/// Main configuration for the negotiation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NegotiatorConfig {
    /// Salience thresholds
    #[serde(default)]
    pub scoring: ScoringPolicy,

    /// Input size limits enforced by the validator
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Session cache settings
    #[serde(default)]
    pub cache: SessionCacheConfig,

    /// Relationship summary settings
    #[serde(default)]
    pub landscape: LandscapeConfig,

    /// Leverage synthesis settings
    #[serde(default)]
    pub leverage: LeverageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds used by the salience scorer.
///
/// The defaults are policy choices carried over unchanged; they are tunable,
/// not derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// An attribute counts as "high" at or above this value
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    /// Positions at or above this value are Supportive
    #[serde(default = "default_supportive_threshold")]
    pub supportive_threshold: f64,

    /// Positions at or below this value are Adversarial
    #[serde(default = "default_adversarial_threshold")]
    pub adversarial_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            high_threshold: default_high_threshold(),
            supportive_threshold: default_supportive_threshold(),
            adversarial_threshold: default_adversarial_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_context_chars")]
    pub min_context_chars: usize,

    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    #[serde(default = "default_max_stakeholders")]
    pub max_stakeholders: usize,

    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,

    #[serde(default = "default_max_role_chars")]
    pub max_role_chars: usize,

    /// Maximum entries in one stakeholder's `influenced_by`
    #[serde(default = "default_max_influences")]
    pub max_influences: usize,

    #[serde(default = "default_max_session_key_chars")]
    pub max_session_key_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_context_chars: default_min_context_chars(),
            max_context_chars: default_max_context_chars(),
            max_stakeholders: default_max_stakeholders(),
            max_name_chars: default_max_name_chars(),
            max_role_chars: default_max_role_chars(),
            max_influences: default_max_influences(),
            max_session_key_chars: default_max_session_key_chars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCacheConfig {
    /// Lifetime of a cached analysis, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl SessionCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeConfig {
    /// Number of key connectors / key influence targets reported
    #[serde(default = "default_key_actor_limit")]
    pub key_actor_limit: usize,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            key_actor_limit: default_key_actor_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageConfig {
    /// Traversal depth separating direct from indirect influencers
    #[serde(default = "default_indirect_depth")]
    pub indirect_depth: usize,

    /// Maximum members proposed for a peer coalition
    #[serde(default = "default_peer_coalition_size")]
    pub peer_coalition_size: usize,

    /// Target power at or above which a high-power risk is reported
    #[serde(default = "default_high_power_risk")]
    pub high_power_risk: f64,

    /// Target urgency at or below which a low-urgency risk is reported
    #[serde(default = "default_low_urgency_risk")]
    pub low_urgency_risk: f64,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            indirect_depth: default_indirect_depth(),
            peer_coalition_size: default_peer_coalition_size(),
            high_power_risk: default_high_power_risk(),
            low_urgency_risk: default_low_urgency_risk(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_high_threshold() -> f64 {
    0.7
}
fn default_supportive_threshold() -> f64 {
    0.3
}
fn default_adversarial_threshold() -> f64 {
    -0.3
}
fn default_min_context_chars() -> usize {
    CONTEXT_HARD_FLOOR
}
fn default_max_context_chars() -> usize {
    1000
}
fn default_max_stakeholders() -> usize {
    STAKEHOLDER_HARD_CAP
}
fn default_max_name_chars() -> usize {
    200
}
fn default_max_role_chars() -> usize {
    200
}
fn default_max_influences() -> usize {
    20
}
fn default_max_session_key_chars() -> usize {
    256
}
fn default_cache_ttl_secs() -> u64 {
    30 * 60
}
fn default_key_actor_limit() -> usize {
    5
}
fn default_indirect_depth() -> usize {
    2
}
fn default_peer_coalition_size() -> usize {
    5
}
fn default_high_power_risk() -> f64 {
    0.8
}
fn default_low_urgency_risk() -> f64 {
    0.3
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager: `.env`, then a TOML file, then environment overrides
pub struct ConfigManager {
    config: NegotiatorConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (including a `.env` file)
    /// 2. Config file (`$NEGOTIATOR_CONFIG`, `./negotiator.toml`, `./.negotiator.toml`, `~/.negotiator/config.toml`)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading negotiator configuration");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!(path = %path.display(), "Configuration loaded"),
            None => info!("Configuration loaded (defaults, no config file)"),
        }
        info!(
            ttl_secs = config.cache.ttl_secs,
            high_threshold = config.scoring.high_threshold,
            max_stakeholders = config.limits.max_stakeholders,
            "Effective engine settings"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit config file, still honouring environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory configuration after validating it
    pub fn from_config(config: NegotiatorConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".negotiator.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .negotiator.env: {}", e);
                } else {
                    info!("Loaded .negotiator.env from home directory");
                }
            }
        }
    }

    fn load_config_file() -> Result<(NegotiatorConfig, Option<PathBuf>), ConfigError> {
        if let Ok(explicit) = std::env::var("NEGOTIATOR_CONFIG") {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            let config = Self::read_toml_file(&path)?;
            return Ok((config, Some(path)));
        }

        for local in ["negotiator.toml", ".negotiator.toml"] {
            let local_config = Path::new(local);
            if local_config.exists() {
                let config = Self::read_toml_file(local_config)?;
                return Ok((config, Some(local_config.to_path_buf())));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".negotiator").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((NegotiatorConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<NegotiatorConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: NegotiatorConfig) -> NegotiatorConfig {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            let raw = std::env::var(key).ok()?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring unparsable environment override");
                    None
                }
            }
        }

        if let Some(ttl) = parsed("NEGOTIATOR_CACHE_TTL_SECS") {
            config.cache.ttl_secs = ttl;
        }
        if let Some(threshold) = parsed("NEGOTIATOR_HIGH_THRESHOLD") {
            config.scoring.high_threshold = threshold;
        }
        if let Some(threshold) = parsed("NEGOTIATOR_SUPPORTIVE_THRESHOLD") {
            config.scoring.supportive_threshold = threshold;
        }
        if let Some(threshold) = parsed("NEGOTIATOR_ADVERSARIAL_THRESHOLD") {
            config.scoring.adversarial_threshold = threshold;
        }
        if let Some(max) = parsed("NEGOTIATOR_MAX_STAKEHOLDERS") {
            config.limits.max_stakeholders = max;
        }
        if let Some(depth) = parsed("NEGOTIATOR_INDIRECT_DEPTH") {
            config.leverage.indirect_depth = depth;
        }
        if let Ok(level) = std::env::var("NEGOTIATOR_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Ok(format) = std::env::var("NEGOTIATOR_LOG_FORMAT") {
            config.logging.format = format.to_lowercase();
        }

        config
    }

    fn validate_config(config: &NegotiatorConfig) -> Result<(), ConfigError> {
        let scoring = &config.scoring;
        if !(scoring.high_threshold > 0.0 && scoring.high_threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "scoring.high_threshold must be in (0, 1], got {}",
                scoring.high_threshold
            )));
        }
        if !(-1.0..=1.0).contains(&scoring.supportive_threshold)
            || !(-1.0..=1.0).contains(&scoring.adversarial_threshold)
        {
            return Err(ConfigError::ValidationError(
                "position thresholds must lie within [-1, 1]".to_string(),
            ));
        }
        if scoring.supportive_threshold <= scoring.adversarial_threshold {
            return Err(ConfigError::ValidationError(format!(
                "scoring.supportive_threshold ({}) must exceed scoring.adversarial_threshold ({})",
                scoring.supportive_threshold, scoring.adversarial_threshold
            )));
        }

        let limits = &config.limits;
        if limits.max_stakeholders == 0 || limits.max_stakeholders > STAKEHOLDER_HARD_CAP {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_stakeholders must be within 1-{}, got {}",
                STAKEHOLDER_HARD_CAP, limits.max_stakeholders
            )));
        }
        if limits.min_context_chars < CONTEXT_HARD_FLOOR {
            return Err(ConfigError::ValidationError(format!(
                "limits.min_context_chars must be at least {}, got {}",
                CONTEXT_HARD_FLOOR, limits.min_context_chars
            )));
        }
        if limits.min_context_chars > limits.max_context_chars {
            return Err(ConfigError::ValidationError(format!(
                "limits.min_context_chars ({}) exceeds limits.max_context_chars ({})",
                limits.min_context_chars, limits.max_context_chars
            )));
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }
        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = NegotiatorConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
