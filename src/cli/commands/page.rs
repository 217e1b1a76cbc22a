//! Page command implementation
//!
//! Renders one page against the persisted context with headless panels and
//! prints what each slot shows.

use super::open_session;
use crate::core::modules::HostOutcome;
use crate::core::pages::{Page, PageState};
use crate::core::workflow::sync_preauth_selection;
use clap::Args;

/// Arguments for the page command
#[derive(Args, Debug)]
pub struct PageArgs {
    /// patients, workspace, preauth, jobs, payer-console or model-inspector
    pub page: Page,
}

impl PageArgs {
    /// Execute the page command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let session = match open_session(config_path, false)? {
            Ok(session) => session,
            Err(code) => return Ok(code),
        };

        let mut state = PageState::default();
        if self.page == Page::PreAuth {
            if let Err(e) = sync_preauth_selection(&session, &mut state).await {
                tracing::warn!(error = %e, "Could not refresh the selected pre-authorization");
                println!("⚠️  Could not refresh the selected pre-authorization: {e}");
            }
        }

        println!("📄 {}", self.page.title());
        let outcomes = session.render_page(self.page, &mut state);
        for outcome in &outcomes {
            print_placeholder(outcome);
        }

        let mounted = outcomes.iter().filter(|o| o.is_mounted()).count();
        println!();
        println!("{mounted} of {} modules mounted", outcomes.len());
        Ok(0)
    }
}

fn print_placeholder(outcome: &HostOutcome) {
    match outcome {
        HostOutcome::Mounted { .. } => {}
        HostOutcome::MissingContext { title, .. } | HostOutcome::Failed { title, .. } => {
            println!("  ⏸  {title}: {}", outcome.placeholder().unwrap_or_default());
        }
        HostOutcome::Unknown { module } => println!("  ❓ {module}: Unknown module"),
    }
}
