//! Page composition
//!
//! A page is a fixed arrangement of module slots. Each slot binds a module to
//! the part of the shared context that module should see; gating then runs
//! against that slice. Pages also translate module outputs back into shared
//! context transitions.

use crate::core::context::{ContextKey, SharedContext, Transition};
use crate::core::events::ResourceRef;
use crate::core::modules::{ModuleContext, ModuleId};
use crate::domain::EntityId;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Top-level navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Patients,
    Workspace,
    PreAuth,
    Jobs,
    PayerConsole,
    ModelInspector,
}

/// Page-local state that survives between renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    /// Bumped whenever modules on the page should re-fetch
    pub refresh: u64,
    /// Resource picked in the timeline, shown by the detail drawer
    pub selected_resource: Option<ResourceRef>,
    /// The latest payer decision asked for a document
    pub document_requested: bool,
}

/// One module placement on a page
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSlot {
    pub module: ModuleId,
    pub context: ModuleContext,
    pub inputs: Option<Value>,
}

impl ModuleSlot {
    fn new(module: ModuleId, context: ModuleContext) -> Self {
        Self {
            module,
            context,
            inputs: None,
        }
    }
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Patients,
        Page::Workspace,
        Page::PreAuth,
        Page::Jobs,
        Page::PayerConsole,
        Page::ModelInspector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Patients => "patients",
            Page::Workspace => "workspace",
            Page::PreAuth => "preauth",
            Page::Jobs => "jobs",
            Page::PayerConsole => "payer-console",
            Page::ModelInspector => "model-inspector",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Patients => "Patients",
            Page::Workspace => "Workspace",
            Page::PreAuth => "Pre-Authorization",
            Page::Jobs => "Jobs",
            Page::PayerConsole => "Payer Console",
            Page::ModelInspector => "Model Inspector",
        }
    }

    /// Slots with fresh page state
    pub fn slots(&self, shared: &SharedContext) -> Vec<ModuleSlot> {
        self.slots_with(shared, &PageState::default())
    }

    /// Slots for the current shared context and page state
    pub fn slots_with(&self, shared: &SharedContext, state: &PageState) -> Vec<ModuleSlot> {
        use ContextKey::*;

        let slice = |keys: &[ContextKey]| ModuleContext::slice(shared, keys);

        match self {
            Page::Patients => vec![
                ModuleSlot::new(ModuleId::PatientSearchPanel, slice(&[CorrelationId])),
                ModuleSlot::new(ModuleId::PatientCreateForm, slice(&[CorrelationId])),
            ],
            Page::Workspace => {
                let mut slots = vec![
                    ModuleSlot::new(ModuleId::PatientSummaryCard, slice(&[PatientId])),
                    ModuleSlot::new(ModuleId::TimelineList, slice(&[PatientId, EncounterId])),
                    ModuleSlot {
                        module: ModuleId::ClinicalEventDetailDrawer,
                        context: slice(&[PatientId, EncounterId, CorrelationId]),
                        inputs: Some(serde_json::json!({
                            "selectedEventRef": state.selected_resource,
                        })),
                    },
                ];
                if shared.job_id.is_some() {
                    slots.push(ModuleSlot::new(ModuleId::JobDetailPanel, slice(&[JobId])));
                }
                slots
            }
            Page::PreAuth => {
                let tracked = |module| {
                    ModuleSlot::new(module, slice(&[PreAuthId, JobId]).with_refresh(state.refresh))
                };
                let mut slots = vec![
                    ModuleSlot::new(ModuleId::PreAuthHistoryList, slice(&[PatientId])),
                    ModuleSlot::new(
                        ModuleId::PreAuthCreateWizard,
                        slice(&[PatientId, EncounterId, CorrelationId]),
                    ),
                    tracked(ModuleId::PreAuthRequestCard),
                    ModuleSlot::new(
                        ModuleId::SubmitButtonWithJobStatus,
                        slice(&[PreAuthId, CorrelationId, JobId]).with_refresh(state.refresh),
                    ),
                    tracked(ModuleId::PreAuthPackageSnapshotViewer),
                    tracked(ModuleId::DecisionPanel),
                ];
                if shared.pre_auth_id.is_some() && state.document_requested {
                    slots.push(ModuleSlot::new(
                        ModuleId::RequestedDocumentUploader,
                        slice(&[PreAuthId, CorrelationId]),
                    ));
                }
                slots
            }
            Page::Jobs => vec![
                ModuleSlot::new(ModuleId::JobList, ModuleContext::empty()),
                ModuleSlot::new(ModuleId::JobDetailPanel, slice(&[JobId])),
            ],
            Page::PayerConsole => vec![
                ModuleSlot::new(ModuleId::PayerRuleSetEditor, ModuleContext::empty()),
                ModuleSlot::new(ModuleId::PayerPreAuthQueue, ModuleContext::empty()),
            ],
            Page::ModelInspector => vec![
                ModuleSlot::new(ModuleId::AdminTools, ModuleContext::empty()),
                ModuleSlot::new(ModuleId::FhirRequestComposer, ModuleContext::empty()),
                ModuleSlot::new(ModuleId::MappingTraceViewer, ModuleContext::empty()),
            ],
        }
    }

    /// React to a module output
    ///
    /// Updates page-local state and returns the shared context transitions to
    /// dispatch, in order. Outputs the page does not understand are ignored.
    pub fn handle_output(
        &self,
        module: ModuleId,
        output: &Value,
        state: &mut PageState,
    ) -> Vec<Transition> {
        let id = |field: &str| {
            output
                .get(field)
                .and_then(Value::as_str)
                .and_then(|value| EntityId::new(value).ok())
        };

        match module {
            ModuleId::PatientSearchPanel => vec![Transition::SetPatient(id("selectedPatientId"))],
            ModuleId::PatientCreateForm => vec![Transition::SetPatient(id("createdPatientId"))],
            ModuleId::JobList => vec![Transition::SetJob(id("selectedJobId"))],
            ModuleId::SubmitButtonWithJobStatus => vec![Transition::SetJob(id("jobId"))],
            ModuleId::PreAuthHistoryList | ModuleId::PreAuthCreateWizard => {
                let field = if module == ModuleId::PreAuthHistoryList {
                    "selectedPreAuthId"
                } else {
                    "createdPreAuthId"
                };
                state.refresh += 1;
                state.document_requested = false;
                vec![Transition::SetJob(None), Transition::SetPreAuth(id(field))]
            }
            ModuleId::TimelineList => {
                state.selected_resource = output
                    .get("selectedEventRef")
                    .and_then(parse_resource_ref);
                Vec::new()
            }
            ModuleId::RequestedDocumentUploader => {
                state.refresh += 1;
                Vec::new()
            }
            _ => {
                tracing::trace!(page = %self, module = %module, "Output ignored");
                Vec::new()
            }
        }
    }
}

fn parse_resource_ref(value: &Value) -> Option<ResourceRef> {
    let resource_type = value.get("resourceType")?.as_str()?.to_string();
    let id = EntityId::new(value.get("id")?.as_str()?).ok()?;
    Some(ResourceRef { resource_type, id })
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Page::ALL.iter().map(Page::as_str).collect();
                format!("Unknown page '{s}'. Must be one of: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CorrelationId;

    fn shared() -> SharedContext {
        let mut shared = SharedContext::new(CorrelationId::new("ui-1").unwrap(), "Dr. X");
        shared.patient_id = EntityId::new("pat-1").ok();
        shared.encounter_id = EntityId::new("enc-1").ok();
        shared.pre_auth_id = EntityId::new("pa-1").ok();
        shared
    }

    fn modules(slots: &[ModuleSlot]) -> Vec<ModuleId> {
        slots.iter().map(|slot| slot.module).collect()
    }

    #[test]
    fn test_workspace_job_panel_only_with_job() {
        let mut shared = shared();
        assert!(!modules(&Page::Workspace.slots(&shared)).contains(&ModuleId::JobDetailPanel));

        shared.job_id = EntityId::new("job-1").ok();
        let slots = Page::Workspace.slots(&shared);
        let job_slot = slots.last().unwrap();
        assert_eq!(job_slot.module, ModuleId::JobDetailPanel);
        assert_eq!(job_slot.context.get(ContextKey::JobId), Some("job-1"));
        assert!(!job_slot.context.has(ContextKey::PatientId));
    }

    #[test]
    fn test_slots_receive_only_their_slice() {
        let slots = Page::Workspace.slots(&shared());
        assert_eq!(slots[0].context.get(ContextKey::PatientId), Some("pat-1"));
        assert!(!slots[0].context.has(ContextKey::EncounterId));
        assert!(slots[2].context.has(ContextKey::CorrelationId));

        let patients = Page::Patients.slots(&shared());
        assert!(!patients[0].context.has(ContextKey::PatientId));
    }

    #[test]
    fn test_preauth_refresh_and_document_slot() {
        let mut state = PageState::default();
        assert!(!modules(&Page::PreAuth.slots_with(&shared(), &state))
            .contains(&ModuleId::RequestedDocumentUploader));

        state.document_requested = true;
        state.refresh = 3;
        let slots = Page::PreAuth.slots_with(&shared(), &state);
        assert_eq!(slots.last().unwrap().module, ModuleId::RequestedDocumentUploader);
        assert_eq!(slots[2].context.refresh, 3);
        assert_eq!(slots[0].context.refresh, 0);
    }

    #[test]
    fn test_history_selection_resets_job_and_bumps_refresh() {
        let mut state = PageState {
            document_requested: true,
            ..Default::default()
        };
        let transitions = Page::PreAuth.handle_output(
            ModuleId::PreAuthHistoryList,
            &serde_json::json!({"selectedPreAuthId": "pa-9"}),
            &mut state,
        );

        assert_eq!(
            transitions,
            vec![
                Transition::SetJob(None),
                Transition::SetPreAuth(EntityId::new("pa-9").ok())
            ]
        );
        assert_eq!(state.refresh, 1);
        assert!(!state.document_requested);
    }

    #[test]
    fn test_timeline_selection_is_page_local() {
        let mut state = PageState::default();
        let transitions = Page::Workspace.handle_output(
            ModuleId::TimelineList,
            &serde_json::json!({"selectedEventRef": {"resourceType": "Observation", "id": "obs-1"}}),
            &mut state,
        );
        assert!(transitions.is_empty());
        assert_eq!(
            state.selected_resource.as_ref().map(ToString::to_string).as_deref(),
            Some("Observation/obs-1")
        );

        let slots = Page::Workspace.slots_with(&shared(), &state);
        assert_eq!(
            slots[2].inputs,
            Some(serde_json::json!({"selectedEventRef": {"resourceType": "Observation", "id": "obs-1"}}))
        );
    }

    #[test]
    fn test_page_names() {
        for page in Page::ALL {
            assert_eq!(page.as_str().parse::<Page>().unwrap(), page);
        }
        assert_eq!("Jobs".parse::<Page>().unwrap(), Page::Jobs);
        assert!("billing".parse::<Page>().is_err());
    }
}
