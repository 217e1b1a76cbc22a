//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `caredesk.toml`.
//! Every section has defaults, so an empty file is a valid configuration that
//! talks to a local API on port 8000.

use serde::{Deserialize, Serialize};

/// Main Caredesk configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaredeskConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Job polling cadence and limits
    #[serde(default)]
    pub polling: PollingConfig,

    /// Session context persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CaredeskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.polling.validate()?;
        self.session.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Display name of the signed-in user, used when the session has none stored
    #[serde(default = "default_user_display")]
    pub user_display: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.user_display.trim().is_empty() {
            return Err("application.user_display cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            user_display: default_user_display(),
        }
    }
}

/// Remote clinical-record / job API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API; a trailing slash is ignored
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("api.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "api.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err("api.connect_timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

/// Job polling configuration
///
/// The defaults reproduce a fixed 750 ms cadence. `backoff_multiplier > 1.0`
/// stretches the delay after each non-terminal tick up to `max_interval_ms`.
/// `max_attempts = 0` disables the attempt cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between status requests in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Growth factor applied to the delay after each non-terminal tick
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound for the delay in milliseconds
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Maximum number of status requests per session (0 = unbounded)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Random extra delay of up to this many milliseconds per tick
    #[serde(default)]
    pub jitter_ms: u64,
}

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("polling.interval_ms must be greater than 0".to_string());
        }

        if !(1.0..=10.0).contains(&self.backoff_multiplier) {
            return Err(format!(
                "polling.backoff_multiplier must be between 1.0 and 10.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.max_interval_ms < self.interval_ms {
            return Err(format!(
                "polling.max_interval_ms ({}) must be >= polling.interval_ms ({})",
                self.max_interval_ms, self.interval_ms
            ));
        }

        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_interval_ms: default_max_interval_ms(),
            max_attempts: default_max_attempts(),
            jitter_ms: 0,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the JSON file backing the key-value store
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Key the shared context record is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl SessionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.storage_path.is_empty() {
            return Err("session.storage_path cannot be empty".to_string());
        }
        if self.storage_key.is_empty() {
            return Err("session.storage_key cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage_key: default_storage_key(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err(
                "logging.local_path cannot be empty when local_enabled is true".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_display() -> String {
    "Dr. Sample User".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    750
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_interval_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    800
}

fn default_storage_path() -> String {
    ".caredesk/session.json".to_string()
}

fn default_storage_key() -> String {
    "ehr.ui.context.v1".to_string()
}

fn default_local_path() -> String {
    "/var/log/caredesk".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CaredeskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.interval_ms, 750);
        assert_eq!(config.session.storage_key, "ehr.ui.context.v1");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: CaredeskConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.application.user_display, "Dr. Sample User");
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = CaredeskConfig::default();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = CaredeskConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_polling_bounds() {
        let mut config = CaredeskConfig::default();
        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CaredeskConfig::default();
        config.polling.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = CaredeskConfig::default();
        config.polling.max_interval_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = CaredeskConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
