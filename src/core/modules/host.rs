//! Mounting modules
//!
//! [`ModuleHost`] turns a [`MountDecision`] into what the user sees: the
//! mounted component, a "missing context" placeholder naming every absent key,
//! or an "unknown module" card. A component that fails to mount is reported as
//! a failed card; the error never propagates past the host.

use super::context::ModuleContext;
use super::registry::{ModuleId, ModuleRegistry, MountDecision};
use crate::core::context::ContextKey;
use crate::domain::Result;
use serde_json::Value;

/// Callback a mounted component uses to hand results to its page
pub type OutputSink<'a> = &'a (dyn Fn(Value) + Send + Sync);

/// Everything a component receives when mounted
#[derive(Clone, Copy)]
pub struct PanelProps<'a> {
    pub module: ModuleId,
    pub title: &'a str,
    pub context: &'a ModuleContext,
    pub inputs: Option<&'a Value>,
    pub on_output: Option<OutputSink<'a>>,
}

impl PanelProps<'_> {
    /// Forward an output to the page, if it listens
    pub fn emit(&self, output: Value) {
        if let Some(on_output) = self.on_output {
            on_output(output);
        }
    }
}

/// A capability-typed unit that renders against a context slice
pub trait Panel: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the component cannot render.
    fn mount(&self, props: PanelProps<'_>) -> Result<()>;
}

/// What the host rendered for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Mounted { module: ModuleId, title: String },
    MissingContext {
        module: ModuleId,
        title: String,
        missing: Vec<ContextKey>,
    },
    Unknown { module: String },
    Failed {
        module: ModuleId,
        title: String,
        message: String,
    },
}

impl HostOutcome {
    pub fn is_mounted(&self) -> bool {
        matches!(self, HostOutcome::Mounted { .. })
    }

    /// Text of the card shown instead of the component, if any
    pub fn placeholder(&self) -> Option<String> {
        match self {
            HostOutcome::Mounted { .. } => None,
            HostOutcome::MissingContext { missing, .. } => {
                let keys: Vec<&str> = missing.iter().map(ContextKey::as_str).collect();
                Some(format!("Missing context: {}", keys.join(", ")))
            }
            HostOutcome::Unknown { .. } => Some("Unknown module".to_string()),
            HostOutcome::Failed { message, .. } => Some(message.clone()),
        }
    }
}

/// Renders modules from a registry
#[derive(Debug, Clone, Copy)]
pub struct ModuleHost<'r> {
    registry: &'r ModuleRegistry,
}

impl<'r> ModuleHost<'r> {
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Gate and, if allowed, mount a module named by string
    pub fn render_name(
        &self,
        name: &str,
        context: &ModuleContext,
        inputs: Option<&Value>,
        on_output: Option<OutputSink<'_>>,
    ) -> HostOutcome {
        match name.parse::<ModuleId>() {
            Ok(module) => self.render(module, context, inputs, on_output),
            Err(_) => {
                tracing::warn!(module = name, "Unknown module requested");
                HostOutcome::Unknown {
                    module: name.to_string(),
                }
            }
        }
    }

    /// Gate and, if allowed, mount `module`
    pub fn render(
        &self,
        module: ModuleId,
        context: &ModuleContext,
        inputs: Option<&Value>,
        on_output: Option<OutputSink<'_>>,
    ) -> HostOutcome {
        let title = || {
            self.registry
                .descriptor(module)
                .map(|d| d.title.clone())
                .unwrap_or_else(|| module.to_string())
        };

        match self.registry.resolve(module, context) {
            MountDecision::NotFound => {
                tracing::warn!(module = %module, "No component registered for module");
                HostOutcome::Unknown {
                    module: module.to_string(),
                }
            }
            MountDecision::MissingContext(missing) => {
                tracing::debug!(module = %module, missing = ?missing, "Module gated on missing context");
                HostOutcome::MissingContext {
                    module,
                    title: title(),
                    missing,
                }
            }
            MountDecision::Ready { component, title } => {
                let props = PanelProps {
                    module,
                    title: &title,
                    context,
                    inputs,
                    on_output,
                };
                match component.mount(props) {
                    Ok(()) => HostOutcome::Mounted { module, title },
                    Err(e) => {
                        tracing::warn!(module = %module, error = %e, "Module failed to mount");
                        HostOutcome::Failed {
                            module,
                            title,
                            message: e.to_string(),
                        }
                    }
                }
            }
        }
    }
}
