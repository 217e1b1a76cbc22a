//! Configuration management for Caredesk.
//!
//! Caredesk uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CAREDESK_*` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use caredesk::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("caredesk.toml")?;
//! println!("API: {}", config.api.base_url);
//! println!("Poll interval: {} ms", config.polling.interval_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! user_display = "Dr. Sample User"
//!
//! [api]
//! base_url = "${CAREDESK_API_URL}"
//! timeout_seconds = 30
//!
//! [polling]
//! interval_ms = 750
//! backoff_multiplier = 1.0
//! max_interval_ms = 5000
//! max_attempts = 800
//!
//! [session]
//! storage_path = ".caredesk/session.json"
//! storage_key = "ehr.ui.context.v1"
//!
//! [logging]
//! local_enabled = false
//! local_path = "/var/log/caredesk"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str, load_config_or_default};
pub use schema::{
    ApiConfig, ApplicationConfig, CaredeskConfig, LoggingConfig, PollingConfig, SessionConfig,
};
