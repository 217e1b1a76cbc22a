//! Module catalogue, capability gating and mounting
//!
//! ```rust
//! use caredesk::core::modules::{ModuleContext, ModuleId, ModuleRegistry, MountDecision};
//!
//! # fn example() -> caredesk::domain::Result<()> {
//! let registry = ModuleRegistry::bundled()?;
//! let decision = registry.resolve(ModuleId::DecisionPanel, &ModuleContext::empty());
//! // No component registered yet
//! assert!(matches!(decision, MountDecision::NotFound));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod host;
pub mod registry;

pub use context::ModuleContext;
pub use host::{HostOutcome, ModuleHost, OutputSink, Panel, PanelProps};
pub use registry::{
    ContextRequirements, ModuleDescriptor, ModuleId, ModuleRegistry, MountDecision,
};
