//! Module catalogue and mount gating
//!
//! The catalogue ships as a JSON manifest next to this file:
//!
//! ```json
//! { "id": "DecisionPanel", "title": "Payer Decision", "requiredContext": { "preAuthId": true } }
//! ```
//!
//! A key mapped to `true` must be present in the module's context before it may
//! mount. Keys mapped to `false` or left out are not required.

use super::context::ModuleContext;
use super::host::Panel;
use crate::core::context::ContextKey;
use crate::domain::{CaredeskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const BUNDLED_MANIFEST: &str = include_str!("registry.json");

/// Every module the workstation knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleId {
    PatientSearchPanel,
    PatientCreateForm,
    PatientSummaryCard,
    TimelineList,
    ClinicalEventDetailDrawer,
    PreAuthCreateWizard,
    PreAuthHistoryList,
    PreAuthRequestCard,
    PreAuthPackageSnapshotViewer,
    DecisionPanel,
    RequestedDocumentUploader,
    SubmitButtonWithJobStatus,
    JobList,
    JobDetailPanel,
    #[serde(rename = "FHIRRequestComposer")]
    FhirRequestComposer,
    MappingTraceViewer,
    PayerRuleSetEditor,
    PayerPreAuthQueue,
    AdminTools,
}

impl ModuleId {
    pub const ALL: [ModuleId; 19] = [
        ModuleId::PatientSearchPanel,
        ModuleId::PatientCreateForm,
        ModuleId::PatientSummaryCard,
        ModuleId::TimelineList,
        ModuleId::ClinicalEventDetailDrawer,
        ModuleId::PreAuthCreateWizard,
        ModuleId::PreAuthHistoryList,
        ModuleId::PreAuthRequestCard,
        ModuleId::PreAuthPackageSnapshotViewer,
        ModuleId::DecisionPanel,
        ModuleId::RequestedDocumentUploader,
        ModuleId::SubmitButtonWithJobStatus,
        ModuleId::JobList,
        ModuleId::JobDetailPanel,
        ModuleId::FhirRequestComposer,
        ModuleId::MappingTraceViewer,
        ModuleId::PayerRuleSetEditor,
        ModuleId::PayerPreAuthQueue,
        ModuleId::AdminTools,
    ];

    /// Manifest identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::PatientSearchPanel => "PatientSearchPanel",
            ModuleId::PatientCreateForm => "PatientCreateForm",
            ModuleId::PatientSummaryCard => "PatientSummaryCard",
            ModuleId::TimelineList => "TimelineList",
            ModuleId::ClinicalEventDetailDrawer => "ClinicalEventDetailDrawer",
            ModuleId::PreAuthCreateWizard => "PreAuthCreateWizard",
            ModuleId::PreAuthHistoryList => "PreAuthHistoryList",
            ModuleId::PreAuthRequestCard => "PreAuthRequestCard",
            ModuleId::PreAuthPackageSnapshotViewer => "PreAuthPackageSnapshotViewer",
            ModuleId::DecisionPanel => "DecisionPanel",
            ModuleId::RequestedDocumentUploader => "RequestedDocumentUploader",
            ModuleId::SubmitButtonWithJobStatus => "SubmitButtonWithJobStatus",
            ModuleId::JobList => "JobList",
            ModuleId::JobDetailPanel => "JobDetailPanel",
            ModuleId::FhirRequestComposer => "FHIRRequestComposer",
            ModuleId::MappingTraceViewer => "MappingTraceViewer",
            ModuleId::PayerRuleSetEditor => "PayerRuleSetEditor",
            ModuleId::PayerPreAuthQueue => "PayerPreAuthQueue",
            ModuleId::AdminTools => "AdminTools",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModuleId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown module: {s}"))
    }
}

/// Which context keys a module needs
pub type ContextRequirements = BTreeMap<ContextKey, bool>;

/// Static description of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub required_context: ContextRequirements,
}

impl ModuleDescriptor {
    /// Required keys absent from `context`, in key order
    pub fn missing_keys(&self, context: &ModuleContext) -> Vec<ContextKey> {
        self.required_context
            .iter()
            .filter(|(_, required)| **required)
            .map(|(key, _)| *key)
            .filter(|key| !context.has(*key))
            .collect()
    }

    /// Keys flagged as required
    pub fn required_keys(&self) -> Vec<ContextKey> {
        self.required_context
            .iter()
            .filter_map(|(key, required)| required.then_some(*key))
            .collect()
    }
}

/// Result of gating a module against a context
pub enum MountDecision {
    /// No descriptor or no component for the module
    NotFound,
    /// Required keys absent from the context; lists all of them
    MissingContext(Vec<ContextKey>),
    /// The module may mount
    Ready {
        component: Arc<dyn Panel>,
        title: String,
    },
}

impl fmt::Debug for MountDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountDecision::NotFound => f.write_str("NotFound"),
            MountDecision::MissingContext(keys) => {
                f.debug_tuple("MissingContext").field(keys).finish()
            }
            MountDecision::Ready { title, .. } => {
                f.debug_struct("Ready").field("title", title).finish_non_exhaustive()
            }
        }
    }
}

/// Descriptors plus the components registered for them
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    descriptors: BTreeMap<ModuleId, ModuleDescriptor>,
    components: BTreeMap<ModuleId, Arc<dyn Panel>>,
}

impl ModuleRegistry {
    /// Registry with the bundled catalogue and no components
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bundled manifest is malformed.
    pub fn bundled() -> Result<Self> {
        Self::from_manifest(BUNDLED_MANIFEST)
    }

    /// Parse a JSON manifest (array of descriptors)
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed JSON, unknown module ids, or
    /// unknown context keys.
    pub fn from_manifest(json: &str) -> Result<Self> {
        let descriptors: Vec<ModuleDescriptor> = serde_json::from_str(json)
            .map_err(|e| CaredeskError::Configuration(format!("Invalid module manifest: {e}")))?;

        let mut registry = Self::default();
        for descriptor in descriptors {
            if registry.descriptors.contains_key(&descriptor.id) {
                return Err(CaredeskError::Configuration(format!(
                    "Duplicate module in manifest: {}",
                    descriptor.id
                )));
            }
            registry.descriptors.insert(descriptor.id, descriptor);
        }

        tracing::debug!(modules = registry.descriptors.len(), "Module manifest loaded");
        Ok(registry)
    }

    /// Attach the component that renders `id`
    pub fn register(&mut self, id: ModuleId, component: Arc<dyn Panel>) -> &mut Self {
        self.components.insert(id, component);
        self
    }

    /// Attach one component to every catalogued module
    pub fn register_all(&mut self, component: Arc<dyn Panel>) -> &mut Self {
        let ids: Vec<ModuleId> = self.descriptors.keys().copied().collect();
        for id in ids {
            self.components.insert(id, Arc::clone(&component));
        }
        self
    }

    pub fn descriptor(&self, id: ModuleId) -> Option<&ModuleDescriptor> {
        self.descriptors.get(&id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.values()
    }

    pub fn is_registered(&self, id: ModuleId) -> bool {
        self.components.contains_key(&id)
    }

    /// Decide whether `id` may mount with `context`
    pub fn resolve(&self, id: ModuleId, context: &ModuleContext) -> MountDecision {
        let (Some(descriptor), Some(component)) =
            (self.descriptors.get(&id), self.components.get(&id))
        else {
            return MountDecision::NotFound;
        };

        let missing = descriptor.missing_keys(context);
        if !missing.is_empty() {
            return MountDecision::MissingContext(missing);
        }

        MountDecision::Ready {
            component: Arc::clone(component),
            title: descriptor.title.clone(),
        }
    }

    /// [`ModuleRegistry::resolve`] for a module named by string
    pub fn resolve_name(&self, name: &str, context: &ModuleContext) -> MountDecision {
        match name.parse::<ModuleId>() {
            Ok(id) => self.resolve(id, context),
            Err(_) => MountDecision::NotFound,
        }
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("descriptors", &self.descriptors.len())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
