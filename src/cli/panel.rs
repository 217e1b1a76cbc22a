//! Terminal stand-in for module components
//!
//! The CLI has no widgets to mount, so every module is backed by a panel that
//! reports what it would render: its title and the context slice it received.

use crate::core::modules::{ModuleRegistry, Panel, PanelProps};
use crate::domain::Result;
use std::sync::Arc;

/// Logs every mount and prints a one-line summary
#[derive(Debug, Default)]
pub struct HeadlessPanel {
    quiet: bool,
}

impl HeadlessPanel {
    /// Panel that only logs, without printing
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Panel for HeadlessPanel {
    fn mount(&self, props: PanelProps<'_>) -> Result<()> {
        let context = serde_json::to_string(props.context)?;
        tracing::debug!(module = %props.module, context = %context, "Module mounted");

        if !self.quiet {
            println!("  ✅ {} ({})", props.title, props.module);
            println!("     context: {context}");
            if let Some(inputs) = props.inputs {
                println!("     inputs:  {inputs}");
            }
        }
        Ok(())
    }
}

/// The bundled catalogue with every module backed by a [`HeadlessPanel`]
pub fn headless_registry(quiet: bool) -> Result<ModuleRegistry> {
    let panel: Arc<dyn Panel> = if quiet {
        Arc::new(HeadlessPanel::quiet())
    } else {
        Arc::new(HeadlessPanel::default())
    };

    let mut registry = ModuleRegistry::bundled()?;
    registry.register_all(panel);
    Ok(registry)
}
