//! Configuration management for qchess.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QCHESS_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Random and self-play settings
    #[serde(default)]
    pub play: PlayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Measurement seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Cap on basis states; split and merge moves that could exceed it are refused
    #[serde(default = "default_max_basis_states")]
    pub max_basis_states: usize,
}

/// Random play settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Probability of preferring a split or merge when picking a random move
    #[serde(default = "default_split_weight")]
    pub split_weight: f64,

    /// Move limit for one self-play game
    #[serde(default = "default_max_self_play_moves")]
    pub max_self_play_moves: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_max_basis_states() -> usize {
    4096
}

fn default_split_weight() -> f64 {
    0.2
}

fn default_max_self_play_moves() -> usize {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: None,
            max_basis_states: default_max_basis_states(),
        }
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            split_weight: default_split_weight(),
            max_self_play_moves: default_max_self_play_moves(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EngineConfig {
    /// Default settings with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

impl Config {
    /// Default config file location: `~/.qchess/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qchess").join("config.yaml"))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Environment variable overrides
    /// 2. The given file, or the default file if it exists
    /// 3. Defaults
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables that are set override the current values. A set but
    /// unparsable numeric variable is an error.
    fn merge_env(mut self) -> Result<Self, ConfigError> {
        // Engine
        if let Ok(v) = std::env::var("QCHESS_SEED") {
            self.engine.seed = Some(parse_env("QCHESS_SEED", &v)?);
        }
        if let Ok(v) = std::env::var("QCHESS_MAX_BASIS_STATES") {
            self.engine.max_basis_states = parse_env("QCHESS_MAX_BASIS_STATES", &v)?;
        }

        // Play
        if let Ok(v) = std::env::var("QCHESS_SPLIT_WEIGHT") {
            self.play.split_weight = parse_env("QCHESS_SPLIT_WEIGHT", &v)?;
        }

        // Logging
        if let Ok(v) = std::env::var("QCHESS_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("QCHESS_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_basis_states == 0 {
            return Err(ConfigError::ValidationError(
                "max_basis_states must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.play.split_weight) {
            return Err(ConfigError::ValidationError(format!(
                "split_weight must be within [0, 1], got {}",
                self.play.split_weight
            )));
        }

        if self.play.max_self_play_moves == 0 {
            return Err(ConfigError::ValidationError(
                "max_self_play_moves must be greater than 0".to_string(),
            ));
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Serialize to YAML, e.g. to write a starter config file.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{name} has invalid value '{value}'")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
