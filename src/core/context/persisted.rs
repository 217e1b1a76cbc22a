//! Durable form of the shared context
//!
//! Stored as one JSON object:
//!
//! ```json
//! {"patientId":"pat-1","encounterId":"enc-7","correlationId":"ui-…","userDisplay":"Dr. Sample User"}
//! ```
//!
//! Loading validates each field on its own. A field that is missing, empty, or
//! not a string is dropped and the rest of the record is kept; a record that is
//! not a JSON object is ignored entirely.

use super::state::SharedContext;
use crate::domain::{CorrelationId, EntityId, Result};
use serde::Serialize;
use serde_json::Value;

/// Fields recovered from a stored record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_auth_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_display: Option<String>,
}

impl PersistedContext {
    /// Decode a stored record; never fails
    pub fn decode(raw: &str) -> Self {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Stored context is not valid JSON, ignoring it");
                return Self::default();
            }
        };

        let Some(record) = parsed.as_object() else {
            tracing::warn!("Stored context is not a JSON object, ignoring it");
            return Self::default();
        };

        let text = |name: &str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
        };

        Self {
            patient_id: text("patientId").and_then(|v| EntityId::new(v).ok()),
            encounter_id: text("encounterId").and_then(|v| EntityId::new(v).ok()),
            pre_auth_id: text("preAuthId").and_then(|v| EntityId::new(v).ok()),
            job_id: text("jobId").and_then(|v| EntityId::new(v).ok()),
            correlation_id: text("correlationId").and_then(|v| CorrelationId::new(v).ok()),
            user_display: text("userDisplay").map(str::to_string),
        }
    }

    /// Fill in session defaults for the fields the record did not provide
    pub fn into_context(self, default_user_display: &str) -> SharedContext {
        SharedContext {
            patient_id: self.patient_id,
            encounter_id: self.encounter_id,
            pre_auth_id: self.pre_auth_id,
            job_id: self.job_id,
            correlation_id: self.correlation_id.unwrap_or_else(CorrelationId::generate),
            user_display: self
                .user_display
                .unwrap_or_else(|| default_user_display.to_string()),
        }
    }
}

impl From<&SharedContext> for PersistedContext {
    fn from(state: &SharedContext) -> Self {
        Self {
            patient_id: state.patient_id.clone(),
            encounter_id: state.encounter_id.clone(),
            pre_auth_id: state.pre_auth_id.clone(),
            job_id: state.job_id.clone(),
            correlation_id: Some(state.correlation_id.clone()),
            user_display: Some(state.user_display.clone()),
        }
    }
}

/// Encode the full state for storage
pub fn encode(state: &SharedContext) -> Result<String> {
    Ok(serde_json::to_string(&PersistedContext::from(state))?)
}
