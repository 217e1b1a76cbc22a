//! Watch-job command implementation

use super::{open_session, shutdown_requested, EXIT_INTERRUPTED};
use crate::core::context::Transition;
use crate::core::polling::PollOutcome;
use crate::domain::{EntityId, Job, JobStatus};
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the watch-job command
#[derive(Args, Debug)]
pub struct WatchJobArgs {
    /// Job to follow; defaults to the job in the session context
    pub job_id: Option<String>,

    /// Poll interval in milliseconds, overriding the configured one
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl WatchJobArgs {
    /// Execute the watch-job command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let session = match open_session(config_path, true)? {
            Ok(session) => session,
            Err(code) => return Ok(code),
        };

        let job_id = match &self.job_id {
            Some(id) => EntityId::new(id.as_str()).map_err(anyhow::Error::msg)?,
            None => match session.context().job_id.clone() {
                Some(id) => id,
                None => {
                    println!("❌ No job id given and none in the session context");
                    return Ok(1);
                }
            },
        };

        if self.job_id.is_some() {
            session.dispatch(Transition::SetJob(Some(job_id.clone())));
        }

        println!("⏳ Watching job {job_id}");
        let handle = match self.interval_ms {
            Some(ms) => session.poller().poll_every(
                job_id.clone(),
                Duration::from_millis(ms),
                print_tick,
                |_| {},
            ),
            None => session.poller().poll(job_id.clone(), print_tick, |_| {}),
        };

        tokio::select! {
            outcome = handle.wait() => Ok(report(&job_id, outcome)),
            _ = shutdown_requested(&mut shutdown_signal) => {
                println!("\n⚠️  Stopped watching {job_id}");
                Ok(EXIT_INTERRUPTED)
            }
        }
    }
}

fn print_tick(job: &Job) {
    match &job.message {
        Some(message) => println!("  {} {:>3}% {}", job.status, job.progress, message),
        None => println!("  {} {:>3}%", job.status, job.progress),
    }
}

/// Print the outcome and map it to an exit code
pub(crate) fn report(job_id: &EntityId, outcome: PollOutcome) -> i32 {
    match outcome {
        PollOutcome::Terminal(job) if job.status == JobStatus::Succeeded => {
            println!("✅ Job {job_id} succeeded");
            0
        }
        PollOutcome::Terminal(job) => {
            println!("❌ Job {job_id} {}", job.status);
            if let Some(error) = job.error {
                println!("   Error: {error}");
            }
            3
        }
        PollOutcome::Failed(e) => {
            println!("❌ Could not read job {job_id}");
            println!("   Error: {e}");
            3
        }
        PollOutcome::Exhausted { attempts } => {
            println!("⚠️  Job {job_id} still running after {attempts} checks");
            3
        }
        PollOutcome::Cancelled => EXIT_INTERRUPTED,
    }
}
