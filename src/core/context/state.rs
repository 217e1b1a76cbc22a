//! Shared context record and its transitions
//!
//! [`SharedContext`] is the single record of "what the user is working on".
//! It only changes through [`Transition`]s applied by [`reduce`], which keeps
//! the patient-scoped fields consistent with the active patient.

use crate::domain::{CorrelationId, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Current working entities for one session
///
/// `encounter_id`, `pre_auth_id` and `job_id` belong to the active patient and
/// are cleared whenever the patient changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedContext {
    pub patient_id: Option<EntityId>,
    pub encounter_id: Option<EntityId>,
    pub pre_auth_id: Option<EntityId>,
    pub job_id: Option<EntityId>,
    pub correlation_id: CorrelationId,
    pub user_display: String,
}

impl SharedContext {
    /// Empty context with the given session identity
    pub fn new(correlation_id: CorrelationId, user_display: impl Into<String>) -> Self {
        Self {
            patient_id: None,
            encounter_id: None,
            pre_auth_id: None,
            job_id: None,
            correlation_id,
            user_display: user_display.into(),
        }
    }

    /// Value of a context key, if present
    pub fn get(&self, key: ContextKey) -> Option<&str> {
        match key {
            ContextKey::PatientId => self.patient_id.as_ref().map(EntityId::as_str),
            ContextKey::EncounterId => self.encounter_id.as_ref().map(EntityId::as_str),
            ContextKey::PreAuthId => self.pre_auth_id.as_ref().map(EntityId::as_str),
            ContextKey::JobId => self.job_id.as_ref().map(EntityId::as_str),
            ContextKey::CorrelationId => Some(self.correlation_id.as_str()),
        }
    }
}

/// Keys of the shared context that modules can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextKey {
    PatientId,
    EncounterId,
    PreAuthId,
    JobId,
    CorrelationId,
}

impl ContextKey {
    pub const ALL: [ContextKey; 5] = [
        ContextKey::PatientId,
        ContextKey::EncounterId,
        ContextKey::PreAuthId,
        ContextKey::JobId,
        ContextKey::CorrelationId,
    ];

    /// Wire name, as used in persisted records and module manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::PatientId => "patientId",
            ContextKey::EncounterId => "encounterId",
            ContextKey::PreAuthId => "preAuthId",
            ContextKey::JobId => "jobId",
            ContextKey::CorrelationId => "correlationId",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown context key: {s}"))
    }
}

/// The only ways the shared context can change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Switch patient; clears encounter, pre-auth and job unless the patient is unchanged
    SetPatient(Option<EntityId>),
    SetEncounter(Option<EntityId>),
    SetPreAuth(Option<EntityId>),
    SetJob(Option<EntityId>),
    SetCorrelationId(CorrelationId),
}

impl Transition {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Transition::SetPatient(_) => "set_patient",
            Transition::SetEncounter(_) => "set_encounter",
            Transition::SetPreAuth(_) => "set_pre_auth",
            Transition::SetJob(_) => "set_job",
            Transition::SetCorrelationId(_) => "set_correlation_id",
        }
    }
}

/// Apply one transition
///
/// Returns the same `Arc` when the transition is a no-op (setting the current
/// patient again), so callers can detect "nothing changed" with `Arc::ptr_eq`.
///
/// # Examples
///
/// ```
/// use caredesk::core::context::{reduce, SharedContext, Transition};
/// use caredesk::domain::{CorrelationId, EntityId};
/// use std::sync::Arc;
///
/// let state = Arc::new(SharedContext::new(CorrelationId::generate(), "Dr. Sample User"));
/// let patient = EntityId::new("pat-1").unwrap();
///
/// let next = reduce(&state, Transition::SetPatient(Some(patient.clone())));
/// assert_eq!(next.patient_id, Some(patient.clone()));
///
/// let again = reduce(&next, Transition::SetPatient(Some(patient)));
/// assert!(Arc::ptr_eq(&next, &again));
/// ```
pub fn reduce(state: &Arc<SharedContext>, transition: Transition) -> Arc<SharedContext> {
    let mut next = SharedContext::clone(state);

    match transition {
        Transition::SetPatient(patient_id) => {
            if patient_id == state.patient_id {
                return Arc::clone(state);
            }
            next.patient_id = patient_id;
            next.encounter_id = None;
            next.pre_auth_id = None;
            next.job_id = None;
        }
        Transition::SetEncounter(encounter_id) => next.encounter_id = encounter_id,
        Transition::SetPreAuth(pre_auth_id) => next.pre_auth_id = pre_auth_id,
        Transition::SetJob(job_id) => next.job_id = job_id,
        Transition::SetCorrelationId(correlation_id) => next.correlation_id = correlation_id,
    }

    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn working_state() -> Arc<SharedContext> {
        let mut state = SharedContext::new(CorrelationId::new("ui-1").unwrap(), "Dr. Sample User");
        state.patient_id = Some(id("pat-1"));
        state.encounter_id = Some(id("enc-1"));
        state.pre_auth_id = Some(id("pa-1"));
        state.job_id = Some(id("job-1"));
        Arc::new(state)
    }

    #[test]
    fn test_set_patient_clears_dependents() {
        let state = working_state();
        let next = reduce(&state, Transition::SetPatient(Some(id("pat-2"))));

        assert_eq!(next.patient_id, Some(id("pat-2")));
        assert_eq!(next.encounter_id, None);
        assert_eq!(next.pre_auth_id, None);
        assert_eq!(next.job_id, None);
        assert_eq!(next.correlation_id, state.correlation_id);
        assert_eq!(next.user_display, state.user_display);
    }

    #[test]
    fn test_unset_patient_clears_dependents() {
        let next = reduce(&working_state(), Transition::SetPatient(None));
        assert_eq!(next.patient_id, None);
        assert_eq!(next.encounter_id, None);
        assert_eq!(next.job_id, None);
    }

    #[test]
    fn test_same_patient_is_noop() {
        let state = working_state();
        let next = reduce(&state, Transition::SetPatient(Some(id("pat-1"))));
        assert!(Arc::ptr_eq(&state, &next));
        assert_eq!(next.encounter_id, Some(id("enc-1")));
    }

    #[test]
    fn test_dependent_setters_touch_one_field() {
        let state = working_state();

        let next = reduce(&state, Transition::SetJob(None));
        assert_eq!(next.job_id, None);
        assert_eq!(next.pre_auth_id, Some(id("pa-1")));

        let next = reduce(&next, Transition::SetPreAuth(Some(id("pa-2"))));
        assert_eq!(next.pre_auth_id, Some(id("pa-2")));
        assert_eq!(next.encounter_id, Some(id("enc-1")));

        let next = reduce(&next, Transition::SetEncounter(None));
        assert_eq!(next.encounter_id, None);
        assert_eq!(next.patient_id, Some(id("pat-1")));
    }

    #[test]
    fn test_set_correlation_id_is_independent() {
        let state = working_state();
        let correlation = CorrelationId::new("trace-42").unwrap();
        let next = reduce(&state, Transition::SetCorrelationId(correlation.clone()));

        assert_eq!(next.correlation_id, correlation);
        assert_eq!(next.patient_id, state.patient_id);
        assert_eq!(next.job_id, state.job_id);
    }

    #[test]
    fn test_get_by_key() {
        let state = working_state();
        assert_eq!(state.get(ContextKey::PatientId), Some("pat-1"));
        assert_eq!(state.get(ContextKey::CorrelationId), Some("ui-1"));

        let cleared = reduce(&state, Transition::SetJob(None));
        assert_eq!(cleared.get(ContextKey::JobId), None);
    }

    #[test]
    fn test_context_key_names() {
        for key in ContextKey::ALL {
            assert_eq!(key.as_str().parse::<ContextKey>().unwrap(), key);
        }
        assert!("patient_id".parse::<ContextKey>().is_err());
        assert_eq!(
            serde_json::to_string(&ContextKey::PreAuthId).unwrap(),
            "\"preAuthId\""
        );
    }
}
