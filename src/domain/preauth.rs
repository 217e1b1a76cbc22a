//! Pre-authorization request and decision views
//!
//! Only the fields the orchestration layer acts on are typed; the rest of the
//! resource is carried along as raw JSON for panels to render.

use serde::{Deserialize, Serialize};

/// Status value that makes the next submission a resubmission
pub const PENDING_INFO: &str = "pending-info";

/// Pre-authorization request as returned by `GET /preauth/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAuth {
    pub id: String,

    #[serde(default)]
    pub patient_id: Option<String>,

    #[serde(default)]
    pub encounter_id: Option<String>,

    /// Workflow status: draft, submitted, pending-info, resubmitted, in-review, ...
    pub status: String,

    #[serde(default)]
    pub payer: Option<String>,

    #[serde(default)]
    pub latest_decision: Option<Decision>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PreAuth {
    /// Which submit endpoint applies to the request in its current status
    pub fn submission_mode(&self) -> SubmissionMode {
        if self.status == PENDING_INFO {
            SubmissionMode::Resubmit
        } else {
            SubmissionMode::Submit
        }
    }

    /// Drafts and requests waiting on more information can be (re)submitted
    pub fn can_submit(&self) -> bool {
        self.status == "draft" || self.status == PENDING_INFO
    }

    /// A submitted request without a decision can have its payer job re-queued
    pub fn can_enqueue_review(&self) -> bool {
        self.latest_decision.is_none()
            && matches!(
                self.status.as_str(),
                "submitted" | "resubmitted" | "in-review"
            )
    }
}

/// Submit vs. resubmit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Submit,
    Resubmit,
}

impl SubmissionMode {
    /// Path segment of the endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubmissionMode::Submit => "submit",
            SubmissionMode::Resubmit => "resubmit",
        }
    }
}

/// Payer decision on a pre-authorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,

    #[serde(default)]
    pub outcome: Option<String>,

    #[serde(default)]
    pub decided_time: Option<String>,

    #[serde(default)]
    pub reason_codes: Vec<String>,

    #[serde(default)]
    pub rationale: Option<String>,

    #[serde(default)]
    pub requested_additional_info: Vec<serde_json::Value>,
}

impl Decision {
    /// True when the payer asked for a document (any `type: document` item, or an
    /// item whose code mentions an x-ray)
    pub fn requests_document(&self) -> bool {
        self.requested_additional_info.iter().any(|item| {
            let field = |name: &str| {
                item.get(name)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_lowercase()
            };
            let code = field("code");
            field("type") == "document" || code.contains("xray") || code.contains("x-ray")
        })
    }
}

/// Response of the submit / resubmit / enqueue-review endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_id: String,

    #[serde(default)]
    pub pre_auth_id: Option<String>,

    #[serde(default)]
    pub snapshot_id: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,
}
