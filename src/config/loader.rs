//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CaredeskConfig;
use crate::domain::errors::CaredeskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CaredeskConfig
/// 4. Applies environment variable overrides (CAREDESK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use caredesk::config::loader::load_config;
///
/// let config = load_config("caredesk.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CaredeskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CaredeskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CaredeskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply either way. Used by commands
/// that should work without any configuration on disk.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<CaredeskConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    load_config_from_str("")
}

/// Parses, overrides and validates configuration text
pub fn load_config_from_str(contents: &str) -> Result<CaredeskConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CaredeskConfig = toml::from_str(&contents)
        .map_err(|e| CaredeskError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        CaredeskError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CaredeskError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CaredeskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using CAREDESK_* prefix
///
/// Environment variables follow the pattern: CAREDESK_<SECTION>_<KEY>
/// For example: CAREDESK_API_BASE_URL, CAREDESK_POLLING_INTERVAL_MS
fn apply_env_overrides(config: &mut CaredeskConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("CAREDESK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("CAREDESK_APPLICATION_USER_DISPLAY") {
        config.application.user_display = val;
    }

    // API overrides
    if let Ok(val) = std::env::var("CAREDESK_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CAREDESK_API_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_seconds = timeout;
        }
    }

    // Polling overrides
    if let Ok(val) = std::env::var("CAREDESK_POLLING_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.polling.interval_ms = interval;
        }
    }
    if let Ok(val) = std::env::var("CAREDESK_POLLING_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.polling.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("CAREDESK_POLLING_BACKOFF_MULTIPLIER") {
        if let Ok(multiplier) = val.parse() {
            config.polling.backoff_multiplier = multiplier;
        }
    }

    // Session overrides
    if let Ok(val) = std::env::var("CAREDESK_SESSION_STORAGE_PATH") {
        config.session.storage_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CAREDESK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CAREDESK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
