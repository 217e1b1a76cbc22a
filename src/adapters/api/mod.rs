//! Remote API access
//!
//! [`ApiClient`] is the only component that talks HTTP. The poller depends on
//! the narrower [`JobStatusSource`] seam so it can be driven by scripted
//! sources in tests.

pub mod client;

pub use client::{ApiClient, CORRELATION_HEADER};

use crate::domain::{ApiError, EntityId, Job};
use async_trait::async_trait;

/// Anything that can report the current state of a job
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    /// Fetch the job's current state
    ///
    /// # Errors
    ///
    /// Returns the transport or HTTP error that prevented a status read.
    async fn job_status(&self, job_id: &EntityId) -> Result<Job, ApiError>;
}
