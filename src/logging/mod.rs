//! Logging and observability
//!
//! Structured logging with `tracing`:
//! - Console output on stderr
//! - Optional JSON file logging with rotation
//! - Domain macros for the events the orchestration core reports
//!
//! # Example
//!
//! ```no_run
//! use caredesk::logging::init_logging;
//! use caredesk::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Workstation started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a shared-context transition
///
/// # Example
///
/// ```no_run
/// use caredesk::log_transition;
///
/// log_transition!("set_patient", true);
/// ```
#[macro_export]
macro_rules! log_transition {
    ($transition:expr, $changed:expr) => {
        tracing::debug!(
            transition = $transition,
            changed = $changed,
            "Context transition applied"
        );
    };
}

/// Log one tick of a poll session
///
/// # Example
///
/// ```no_run
/// use caredesk::log_poll_tick;
///
/// log_poll_tick!("job-1", 3, "running");
/// ```
#[macro_export]
macro_rules! log_poll_tick {
    ($job_id:expr, $attempt:expr, $status:expr) => {
        tracing::debug!(
            job_id = %$job_id,
            attempt = $attempt,
            status = %$status,
            "Job status tick"
        );
    };
}

/// Log a failed remote API call
///
/// # Example
///
/// ```no_run
/// use caredesk::log_api_error;
/// use caredesk::domain::ApiError;
///
/// let error = ApiError::Timeout("/jobs/j1".to_string());
/// log_api_error!("GET", "/jobs/j1", &error);
/// ```
#[macro_export]
macro_rules! log_api_error {
    ($method:expr, $path:expr, $error:expr) => {
        tracing::warn!(
            method = $method,
            path = $path,
            error = %$error,
            "API request failed"
        );
    };
}
