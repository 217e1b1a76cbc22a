//! Submit-preauth command implementation

use super::watch::report;
use super::{open_session, shutdown_requested, EXIT_INTERRUPTED};
use crate::core::workflow::{enqueue_review_and_track, submit_and_track};
use crate::domain::{CaredeskError, EntityId, Job};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the submit-preauth command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Pre-authorization to submit; defaults to the one in the session context
    pub pre_auth_id: Option<String>,

    /// Re-queue payer review instead of submitting
    #[arg(long)]
    pub review: bool,
}

impl SubmitArgs {
    /// Execute the submit-preauth command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let session = match open_session(config_path, true)? {
            Ok(session) => session,
            Err(code) => return Ok(code),
        };

        let pre_auth_id = match &self.pre_auth_id {
            Some(id) => EntityId::new(id.as_str()).map_err(anyhow::Error::msg)?,
            None => match session.context().pre_auth_id.clone() {
                Some(id) => id,
                None => {
                    println!("❌ No pre-authorization id given and none in the session context");
                    return Ok(1);
                }
            },
        };

        let on_tick = |job: &Job| println!("  {} {:>3}%", job.status, job.progress);

        let result = if self.review {
            println!("📤 Queueing payer review for {pre_auth_id}");
            tokio::select! {
                result = enqueue_review_and_track(&session, &pre_auth_id, on_tick) => result,
                _ = shutdown_requested(&mut shutdown_signal) => return Ok(interrupted()),
            }
        } else {
            println!("📤 Submitting {pre_auth_id}");
            tokio::select! {
                result = submit_and_track(&session, &pre_auth_id, on_tick) => {
                    result.map(|report| (report.job_id, report.outcome, report.decision))
                }
                _ = shutdown_requested(&mut shutdown_signal) => return Ok(interrupted()),
            }
        };

        match result {
            Ok((job_id, outcome, decision)) => {
                let code = report(&job_id, outcome);
                match decision {
                    Some(decision) => println!(
                        "   Decision: {}",
                        decision.outcome.as_deref().unwrap_or("recorded")
                    ),
                    None if code == 0 => println!("   No decision yet"),
                    None => {}
                }
                Ok(code)
            }
            Err(CaredeskError::Validation(message)) => {
                println!("❌ {message}");
                Ok(1)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn interrupted() -> i32 {
    println!("\n⚠️  Stopped tracking; the job keeps running on the server");
    EXIT_INTERRUPTED
}
