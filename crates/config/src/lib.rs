#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for the relay backend
//!
//! Loads boot configuration from a TOML file, falling back to defaults for
//! any missing section. Configuration covers the ambient subsystems only
//! (telemetry, runtime, validation); feature behavior is never configured
//! here.

use relay_errors::{Error, InternalError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Error categories the logger is allowed to emit.
    /// Known values: `internal`, `exception`, `framework_exception`,
    /// `unknown`, `all`.
    #[serde(default = "default_allowed_categories")]
    pub allowed_categories: Vec<String>,
    /// Minimum level the error logger emits at. Known values: `trace`,
    /// `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_min_level")]
    pub min_level: String,
    /// Prefix for span labels emitted by the runtime.
    #[serde(default = "default_span_prefix")]
    pub span_prefix: String,
}

/// Managed runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Whether the blocking entry point is permitted (disabled inside
    /// servers that must never block a worker).
    #[serde(default = "default_allow_blocking")]
    pub allow_blocking: bool,
    /// Whether defect messages may carry the original panic text. Kept off
    /// in release semantics so defect detail only reaches logs.
    #[serde(default)]
    pub expose_defect_messages: bool,
}

/// Validation pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Upper bound on issues reported per request.
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
    /// Body keys elided from error payloads and logs.
    #[serde(default = "default_redact_keys")]
    pub redact_keys: Vec<String>,
}

fn default_allowed_categories() -> Vec<String> {
    vec!["all".to_string()]
}

fn default_min_level() -> String {
    "info".to_string()
}

fn default_span_prefix() -> String {
    "relay".to_string()
}

fn default_allow_blocking() -> bool {
    true
}

fn default_max_issues() -> usize {
    64
}

fn default_redact_keys() -> Vec<String> {
    ["password", "confirm_password", "token", "secret"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            allowed_categories: default_allowed_categories(),
            min_level: default_min_level(),
            span_prefix: default_span_prefix(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            allow_blocking: default_allow_blocking(),
            expose_defect_messages: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_issues: default_max_issues(),
            redact_keys: default_redact_keys(),
        }
    }
}

const KNOWN_CATEGORIES: &[&str] = &[
    "internal",
    "exception",
    "framework_exception",
    "unknown",
    "all",
];

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file, or defaults when the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the file exists but cannot be read or
    /// parsed, or when the parsed configuration violates an invariant.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).await.map_err(|e| {
            InternalError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&raw).map_err(|e| {
            InternalError::config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a value is out of range or unknown.
    pub fn validate(&self) -> Result<(), Error> {
        if self.validation.max_issues == 0 {
            return Err(InternalError::config("validation.max_issues must be at least 1").into());
        }
        for category in &self.telemetry.allowed_categories {
            if !KNOWN_CATEGORIES.contains(&category.as_str()) {
                return Err(InternalError::config(format!(
                    "unknown telemetry category: {category}"
                ))
                .into());
            }
        }
        if !KNOWN_LEVELS.contains(&self.telemetry.min_level.as_str()) {
            return Err(InternalError::config(format!(
                "unknown telemetry level: {}",
                self.telemetry.min_level
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_redact_credentials() {
        let config = Config::default();
        assert!(config
            .validation
            .redact_keys
            .iter()
            .any(|k| k == "password"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_issues_is_rejected() {
        let mut config = Config::default();
        config.validation.max_issues = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut config = Config::default();
        config.telemetry.allowed_categories = vec!["verbose".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut config = Config::default();
        config.telemetry.min_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
