//! Context command implementation
//!
//! Shows or changes the shared context persisted for the next session. Every
//! change goes through the store, so clearing the patient also clears the
//! encounter, pre-authorization and job.

use super::open_session;
use crate::core::context::{SharedContext, Transition};
use crate::domain::{CorrelationId, EntityId};
use clap::{Args, Subcommand};

/// Arguments for the context command
#[derive(Args, Debug)]
pub struct ContextArgs {
    #[command(subcommand)]
    pub command: ContextCommand,
}

/// Context operations; omitting an id clears the field
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ContextCommand {
    /// Print the current context
    Show,
    SetPatient { id: Option<String> },
    SetEncounter { id: Option<String> },
    SetPreauth { id: Option<String> },
    SetJob { id: Option<String> },
    SetCorrelationId { id: String },
    /// Clear everything and start a new correlation id
    Reset,
}

impl ContextCommand {
    fn transition(&self) -> Result<Option<Transition>, String> {
        let entity = |id: &Option<String>| -> Result<Option<EntityId>, String> {
            id.as_deref().map(EntityId::new).transpose()
        };

        Ok(match self {
            ContextCommand::Show | ContextCommand::Reset => None,
            ContextCommand::SetPatient { id } => Some(Transition::SetPatient(entity(id)?)),
            ContextCommand::SetEncounter { id } => Some(Transition::SetEncounter(entity(id)?)),
            ContextCommand::SetPreauth { id } => Some(Transition::SetPreAuth(entity(id)?)),
            ContextCommand::SetJob { id } => Some(Transition::SetJob(entity(id)?)),
            ContextCommand::SetCorrelationId { id } => {
                Some(Transition::SetCorrelationId(CorrelationId::new(id.as_str())?))
            }
        })
    }
}

impl ContextArgs {
    /// Execute the context command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let transition = match self.command.transition() {
            Ok(transition) => transition,
            Err(e) => {
                println!("❌ {e}");
                return Ok(1);
            }
        };

        let session = match open_session(config_path, true)? {
            Ok(session) => session,
            Err(code) => return Ok(code),
        };

        let state = match (&self.command, transition) {
            (ContextCommand::Reset, _) => {
                println!("🔄 Context reset");
                session.store().reset_to_defaults()
            }
            (_, Some(transition)) => {
                tracing::info!(transition = transition.name(), "Applying context change");
                session.dispatch(transition)
            }
            (_, None) => session.context(),
        };

        print_context(&state);
        Ok(0)
    }
}

fn print_context(state: &SharedContext) {
    let show = |value: Option<&EntityId>| value.map_or("-", EntityId::as_str).to_string();

    println!("📋 Session context");
    println!("  User:           {}", state.user_display);
    println!("  Patient:        {}", show(state.patient_id.as_ref()));
    println!("  Encounter:      {}", show(state.encounter_id.as_ref()));
    println!("  Pre-auth:       {}", show(state.pre_auth_id.as_ref()));
    println!("  Job:            {}", show(state.job_id.as_ref()));
    println!("  Correlation id: {}", state.correlation_id);
}
