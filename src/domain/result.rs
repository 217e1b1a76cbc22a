//! Result type alias for Caredesk
//!
//! This module provides a convenient Result type alias that uses CaredeskError
//! as the error type.

use super::errors::CaredeskError;

/// Result type alias for Caredesk operations
///
/// # Examples
///
/// ```
/// use caredesk::domain::result::Result;
/// use caredesk::domain::errors::CaredeskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CaredeskError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CaredeskError>;
