//! Resolve command implementation
//!
//! Answers "would this module mount right now?" against the full persisted
//! context, without rendering anything.

use super::open_session;
use crate::core::modules::{ModuleContext, MountDecision};
use clap::Args;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Module id, e.g. DecisionPanel
    pub module: String,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let session = match open_session(config_path, true)? {
            Ok(session) => session,
            Err(code) => return Ok(code),
        };

        let context = ModuleContext::from_shared(&session.context());
        match session.registry().resolve_name(&self.module, &context) {
            MountDecision::Ready { title, .. } => {
                println!("✅ {title} ({}) can mount", self.module);
                Ok(0)
            }
            MountDecision::MissingContext(missing) => {
                let keys: Vec<&str> = missing.iter().map(|key| key.as_str()).collect();
                println!("⏸  {} is waiting for: {}", self.module, keys.join(", "));
                Ok(1)
            }
            MountDecision::NotFound => {
                println!("❓ Unknown module: {}", self.module);
                println!("   Known modules:");
                for descriptor in session.registry().descriptors() {
                    println!("   - {} ({})", descriptor.id, descriptor.title);
                }
                Ok(1)
            }
        }
    }
}
