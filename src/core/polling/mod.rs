//! Long-running job tracking
//!
//! A [`JobPoller`] asks a [`JobStatusSource`](crate::adapters::api::JobStatusSource)
//! for a job's status on a [`PollPolicy`] cadence until the job is terminal,
//! the session is cancelled, a request fails, or the attempt cap is reached.

pub mod coordinator;
pub mod policy;

pub use coordinator::{JobPoller, PollHandle, PollOutcome};
pub use policy::{PollPolicy, TerminalPredicate};
