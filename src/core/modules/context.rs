//! The slice of shared context handed to a module

use crate::core::context::{ContextKey, SharedContext};
use crate::domain::{CorrelationId, EntityId};
use serde::Serialize;

/// Context a page binds to one module slot
///
/// Pages pass only the keys a module should see, so gating is evaluated
/// against this slice rather than the whole shared context. `refresh` is a
/// counter pages bump to ask mounted modules to re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContext {
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
    pub refresh: u64,
}

impl ModuleContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every key of the shared context
    pub fn from_shared(shared: &SharedContext) -> Self {
        Self::slice(shared, &ContextKey::ALL)
    }

    /// Only the listed keys of the shared context
    ///
    /// # Examples
    ///
    /// ```
    /// use caredesk::core::context::{ContextKey, SharedContext};
    /// use caredesk::core::modules::ModuleContext;
    /// use caredesk::domain::{CorrelationId, EntityId};
    ///
    /// let mut shared = SharedContext::new(CorrelationId::generate(), "Dr. Sample User");
    /// shared.patient_id = EntityId::new("pat-1").ok();
    /// shared.job_id = EntityId::new("job-1").ok();
    ///
    /// let ctx = ModuleContext::slice(&shared, &[ContextKey::JobId]);
    /// assert!(ctx.has(ContextKey::JobId));
    /// assert!(!ctx.has(ContextKey::PatientId));
    /// ```
    pub fn slice(shared: &SharedContext, keys: &[ContextKey]) -> Self {
        let mut ctx = Self::default();
        for key in keys {
            match key {
                ContextKey::PatientId => ctx.patient_id = shared.patient_id.clone(),
                ContextKey::EncounterId => ctx.encounter_id = shared.encounter_id.clone(),
                ContextKey::PreAuthId => ctx.pre_auth_id = shared.pre_auth_id.clone(),
                ContextKey::JobId => ctx.job_id = shared.job_id.clone(),
                ContextKey::CorrelationId => {
                    ctx.correlation_id = Some(shared.correlation_id.clone())
                }
            }
        }
        ctx
    }

    pub fn with_refresh(mut self, refresh: u64) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn get(&self, key: ContextKey) -> Option<&str> {
        match key {
            ContextKey::PatientId => self.patient_id.as_ref().map(EntityId::as_str),
            ContextKey::EncounterId => self.encounter_id.as_ref().map(EntityId::as_str),
            ContextKey::PreAuthId => self.pre_auth_id.as_ref().map(EntityId::as_str),
            ContextKey::JobId => self.job_id.as_ref().map(EntityId::as_str),
            ContextKey::CorrelationId => self.correlation_id.as_ref().map(CorrelationId::as_str),
        }
    }

    /// Present and non-empty
    pub fn has(&self, key: ContextKey) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }
}
