//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Caredesk configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  User: {}", config.application.user_display);
        println!("  API: {}", config.api.base_url);
        println!("  API Timeout: {}s", config.api.timeout_seconds);
        println!("  Poll Interval: {}ms", config.polling.interval_ms);
        if config.polling.max_attempts == 0 {
            println!("  Poll Attempts: unbounded");
        } else {
            println!("  Poll Attempts: {}", config.polling.max_attempts);
        }
        println!("  Session Storage: {}", config.session.storage_path);
        println!("  Session Key: {}", config.session.storage_key);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caredesk.toml");
        std::fs::write(&path, "[polling]\ninterval_ms = 500\n").unwrap();
        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
