//! Server-side job model
//!
//! Long-running operations (pre-auth submission, payer review) are queued on the
//! server and exposed as job resources. The workstation only ever reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status as reported by the job queue
///
/// The queue may grow new states; anything unrecognised is kept verbatim in
/// [`JobStatus::Other`] and treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    Queued,
    /// A worker is processing the job
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Any status this client does not know about
    Other(String),
}

impl JobStatus {
    /// Returns the wire representation
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s.as_str(),
        }
    }

    /// True once no further progress will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobStatus::from(s.as_str()))
    }
}

/// Job resource as returned by `GET /jobs/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job identifier
    pub id: String,

    /// Job type, e.g. `submit_preauth`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    /// Current status
    pub status: JobStatus,

    /// Percent complete, 0-100
    #[serde(default)]
    pub progress: u8,

    /// Human-readable progress message
    #[serde(default)]
    pub message: Option<String>,

    /// Error text for failed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Correlation id the job was created under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<DateTime<Utc>>,
}

impl Job {
    /// Convenience for the terminal check on the job's status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Response body of `GET /jobs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<Job>,
}
