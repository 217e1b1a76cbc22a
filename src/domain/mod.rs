//! Domain models and types for Caredesk.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityId`], [`CorrelationId`])
//! - **Remote resource views** ([`Job`], [`PreAuth`], [`Decision`])
//! - **Error types** ([`CaredeskError`], [`ApiError`], [`PollError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes that cannot be empty, so a context field that holds
//! an id always holds a usable one:
//!
//! ```rust
//! use caredesk::domain::{CorrelationId, EntityId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient = EntityId::new("pat-123")?;
//! let correlation = CorrelationId::new("trace-1")?;
//! assert!(EntityId::new("").is_err());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod job;
pub mod preauth;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ApiError, CaredeskError, PollError};
pub use ids::{CorrelationId, EntityId};
pub use job::{Job, JobList, JobStatus};
pub use preauth::{Decision, JobSubmission, PreAuth, SubmissionMode};
pub use result::Result;
