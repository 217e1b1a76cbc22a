//! Domain error types
//!
//! This module defines the error hierarchy for Caredesk. Errors are values handed
//! back to the immediate caller; nothing in the orchestration core panics on a
//! panel-level failure. Third-party HTTP and storage error types are never exposed.

use thiserror::Error;

/// Main Caredesk error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CaredeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Job polling errors
    #[error("Polling error: {0}")]
    Poll(#[from] PollError),

    /// Durable storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Transport errors raised by the remote API client
///
/// A "not yet created" 404 on a dependent resource is not an error; callers
/// that expect it get `Ok(None)` instead. Everything else that is not a 2xx
/// ends up here with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error calling {url}: {message}")]
    Network { url: String, message: String },

    /// Non-2xx response; `detail` is the JSON-encoded `detail` field (or the whole body)
    #[error("{status} {reason}: {detail}")]
    Http {
        status: u16,
        reason: String,
        detail: String,
    },

    /// Response body could not be decoded into the expected shape
    #[error("Invalid response from {path}: {message}")]
    InvalidResponse { path: String, message: String },

    /// Request exceeded the configured timeout
    #[error("Request timeout calling {0}")]
    Timeout(String),
}

impl ApiError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 answer
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors that end a poll session without a terminal job status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// A status request failed; the session stopped immediately
    #[error("Job status request failed: {0}")]
    Transport(#[from] ApiError),

    /// The session hit its attempt cap before the job finished
    #[error("Job {job_id} still not terminal after {attempts} status requests")]
    AttemptsExhausted { job_id: String, attempts: u32 },
}

// Conversion from std::io::Error
impl From<std::io::Error> for CaredeskError {
    fn from(err: std::io::Error) -> Self {
        CaredeskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CaredeskError {
    fn from(err: serde_json::Error) -> Self {
        CaredeskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CaredeskError {
    fn from(err: toml::de::Error) -> Self {
        CaredeskError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caredesk_error_display() {
        let err = CaredeskError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_http_error_display_matches_wire_format() {
        let err = ApiError::Http {
            status: 404,
            reason: "Not Found".to_string(),
            detail: "\"Not found\"".to_string(),
        };
        assert_eq!(err.to_string(), "404 Not Found: \"Not found\"");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = ApiError::Network {
            url: "http://localhost:8000/jobs/j1".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("Network error calling"));
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = ApiError::Timeout("/jobs/j1".to_string());
        let err: CaredeskError = api_err.into();
        assert!(matches!(err, CaredeskError::Api(_)));
    }

    #[test]
    fn test_poll_error_wraps_transport() {
        let api_err = ApiError::Timeout("/jobs/j1".to_string());
        let poll_err: PollError = api_err.clone().into();
        assert_eq!(poll_err, PollError::Transport(api_err));

        let err: CaredeskError = poll_err.into();
        assert!(matches!(err, CaredeskError::Poll(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CaredeskError = json_err.into();
        assert!(matches!(err, CaredeskError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CaredeskError = toml_err.into();
        assert!(matches!(err, CaredeskError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CaredeskError = io_err.into();
        assert!(matches!(err, CaredeskError::Io(_)));
    }
}
