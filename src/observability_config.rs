//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics of the
//! enhancement engine.

use std::env;

/// Accepted values for `LOG_LEVEL`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted values for `LOG_FORMAT`
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Observability configuration for different environments
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the engine's own targets
    pub log_level: String,
    /// Output format of the log layer (`json` or `pretty`)
    pub log_format: String,
    /// Whether to install the Prometheus recorder
    pub enable_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            enable_metrics: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: lookup("LOG_LEVEL")
                .map(|level| level.trim().to_lowercase())
                .unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|format| format.trim().to_lowercase())
                .unwrap_or(defaults.log_format),
            enable_metrics: lookup("ENABLE_METRICS")
                .and_then(|flag| flag.trim().parse().ok())
                .unwrap_or(defaults.enable_metrics),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether logs should use the human-readable layer
    pub fn use_pretty_logs(&self) -> bool {
        self.log_format == "pretty"
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.trim().is_empty() {
            return Err("Environment name cannot be empty".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Expected one of {:?}",
                self.log_level, LOG_LEVELS
            ));
        }

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(format!(
                "Invalid log format: {}. Expected one of {:?}",
                self.log_format, LOG_FORMATS
            ));
        }

        Ok(())
    }
}

/// Environment-specific configuration presets
pub mod presets {
    use super::ObservabilityConfig;

    /// Development configuration with verbose, readable logs
    pub fn development() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "development".to_string(),
            log_level: "debug".to_string(),
            log_format: "pretty".to_string(),
            enable_metrics: true,
        }
    }

    /// Production configuration with structured logs
    pub fn production() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "production".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            enable_metrics: true,
        }
    }
}
