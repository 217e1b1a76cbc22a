//! Job polling state machine
//!
//! ```text
//! Idle ──poll()──▶ Polling ──terminal status──▶ Terminal
//!                   │  ▲ non-terminal tick
//!                   │  └─────────┘
//!                   ├──cancel()/drop──▶ Cancelled
//!                   ├──request error──▶ Failed
//!                   └──attempt cap────▶ Exhausted
//! ```
//!
//! Each session runs as its own Tokio task and owns its callbacks. Callbacks are
//! invoked while holding the session's cancellation gate, and
//! [`PollHandle::cancel`] waits on the same gate, so once `cancel` returns no
//! callback of that session runs again, even if a response was already in
//! flight. A cancel issued from inside one of the session's own callbacks,
//! directly or through a store listener, only raises the flag: the callback
//! that is running finishes and nothing after it is invoked.

use super::policy::PollPolicy;
use crate::adapters::api::JobStatusSource;
use crate::domain::{ApiError, EntityId, Job, PollError};
use crate::log_poll_tick;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cancellation state shared by a session and its handle
#[derive(Default)]
struct Gate {
    cancelled: AtomicBool,
    /// Held while callbacks run
    delivery: Mutex<()>,
    /// Thread currently running a callback
    runner: Mutex<Option<ThreadId>>,
}

impl Gate {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Raise the flag; returns false if it was already raised
    fn raise(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    fn inside_callback(&self) -> bool {
        *self.runner.lock().unwrap_or_else(PoisonError::into_inner) == Some(thread::current().id())
    }

    /// Wait for a callback running on another thread to finish
    fn settle(&self) {
        if !self.inside_callback() {
            drop(self.delivery.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }

    fn enter(&self) -> Delivery<'_> {
        let guard = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        *self.runner.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        Delivery { gate: self, _guard: guard }
    }
}

/// Marks the current thread as running callbacks until dropped
struct Delivery<'a> {
    gate: &'a Gate,
    _guard: MutexGuard<'a, ()>,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        *self.gate.runner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// How a poll session ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job reached a terminal status; `on_terminal` was invoked with it
    Terminal(Job),
    /// The session was cancelled before reaching a terminal status
    Cancelled,
    /// A status request failed; polling stopped without calling `on_terminal`
    Failed(ApiError),
    /// The attempt cap was reached while the job was still running
    Exhausted { attempts: u32 },
}

impl PollOutcome {
    pub fn terminal_job(&self) -> Option<&Job> {
        match self {
            PollOutcome::Terminal(job) => Some(job),
            _ => None,
        }
    }

    /// Convert into a result, treating failure and exhaustion as errors
    ///
    /// `Ok(None)` means the session was cancelled.
    pub fn into_result(self, job_id: &EntityId) -> Result<Option<Job>, PollError> {
        match self {
            PollOutcome::Terminal(job) => Ok(Some(job)),
            PollOutcome::Cancelled => Ok(None),
            PollOutcome::Failed(error) => Err(PollError::Transport(error)),
            PollOutcome::Exhausted { attempts } => Err(PollError::AttemptsExhausted {
                job_id: job_id.to_string(),
                attempts,
            }),
        }
    }
}

/// Starts poll sessions against a job status source
///
/// # Example
///
/// ```no_run
/// use caredesk::adapters::api::ApiClient;
/// use caredesk::config::ApiConfig;
/// use caredesk::core::polling::{JobPoller, PollOutcome, PollPolicy};
/// use caredesk::domain::EntityId;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(&ApiConfig::default())?;
/// let poller = JobPoller::new(Arc::new(client), PollPolicy::default());
///
/// let handle = poller.poll(
///     EntityId::new("job-1")?,
///     |job| println!("{}: {}%", job.status, job.progress),
///     |job| println!("finished as {}", job.status),
/// );
///
/// if let PollOutcome::Terminal(job) = handle.wait().await {
///     println!("done: {}", job.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JobPoller {
    source: Arc<dyn JobStatusSource>,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(source: Arc<dyn JobStatusSource>, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Start polling `job_id` with this poller's policy
    ///
    /// The first request is issued immediately. `on_tick` runs after every
    /// successful request; `on_terminal` runs once, after the tick that
    /// observed a terminal status.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn poll<T, F>(&self, job_id: EntityId, on_tick: T, on_terminal: F) -> PollHandle
    where
        T: FnMut(&Job) + Send + 'static,
        F: FnOnce(&Job) + Send + 'static,
    {
        self.start(self.policy.clone(), job_id, on_tick, on_terminal)
    }

    /// Like [`JobPoller::poll`] with a different request interval
    pub fn poll_every<T, F>(
        &self,
        job_id: EntityId,
        interval: Duration,
        on_tick: T,
        on_terminal: F,
    ) -> PollHandle
    where
        T: FnMut(&Job) + Send + 'static,
        F: FnOnce(&Job) + Send + 'static,
    {
        let policy = self.policy.clone().with_interval(interval);
        self.start(policy, job_id, on_tick, on_terminal)
    }

    fn start<T, F>(
        &self,
        policy: PollPolicy,
        job_id: EntityId,
        on_tick: T,
        on_terminal: F,
    ) -> PollHandle
    where
        T: FnMut(&Job) + Send + 'static,
        F: FnOnce(&Job) + Send + 'static,
    {
        let gate = Arc::new(Gate::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tracing::debug!(
            job_id = %job_id,
            interval_ms = policy.interval.as_millis() as u64,
            max_attempts = ?policy.max_attempts,
            "Poll session started"
        );

        let callbacks = Callbacks {
            gate: Arc::clone(&gate),
            on_tick,
            on_terminal: Some(on_terminal),
        };
        let task = tokio::spawn(run_session(
            Arc::clone(&self.source),
            policy,
            job_id.clone(),
            callbacks,
            cancel_rx,
        ));

        PollHandle {
            job_id,
            gate,
            cancel_tx,
            task,
        }
    }
}

/// Owner of one poll session
///
/// Dropping the handle cancels the session.
#[must_use = "dropping a PollHandle cancels the poll session"]
pub struct PollHandle {
    job_id: EntityId,
    gate: Arc<Gate>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn job_id(&self) -> &EntityId {
        &self.job_id
    }

    /// Stop the session; idempotent
    ///
    /// Blocks while a callback of this session is running on another thread.
    /// After it returns no further `on_tick` or `on_terminal` call happens.
    pub fn cancel(&self) {
        if self.gate.raise() {
            tracing::debug!(job_id = %self.job_id, "Poll session cancelled");
        }
        self.gate.settle();
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to end
    ///
    /// Dropping the returned future cancels the session.
    pub async fn wait(mut self) -> PollOutcome {
        match (&mut self.task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(job_id = %self.job_id, error = %e, "Poll session task failed");
                PollOutcome::Cancelled
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("job_id", &self.job_id)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

struct Callbacks<T, F> {
    gate: Arc<Gate>,
    on_tick: T,
    on_terminal: Option<F>,
}

impl<T, F> Callbacks<T, F>
where
    T: FnMut(&Job),
    F: FnOnce(&Job),
{
    /// Act on one response; `Some` ends the session
    fn deliver(
        &mut self,
        job_id: &EntityId,
        attempt: u32,
        policy: &PollPolicy,
        response: Result<Job, ApiError>,
    ) -> Option<PollOutcome> {
        let gate = Arc::clone(&self.gate);
        let _delivery = gate.enter();
        if gate.is_cancelled() {
            return Some(PollOutcome::Cancelled);
        }

        let job = match response {
            Ok(job) => job,
            Err(error) => {
                tracing::warn!(
                    job_id = %job_id,
                    attempt,
                    error = %error,
                    "Job status request failed, polling stopped"
                );
                return Some(PollOutcome::Failed(error));
            }
        };

        log_poll_tick!(job_id, attempt, job.status);
        (self.on_tick)(&job);
        if gate.is_cancelled() {
            return Some(PollOutcome::Cancelled);
        }

        if !(policy.is_terminal)(&job) {
            return None;
        }

        if let Some(on_terminal) = self.on_terminal.take() {
            on_terminal(&job);
        }
        tracing::info!(
            job_id = %job_id,
            status = %job.status,
            attempts = attempt,
            "Job reached terminal status"
        );
        Some(PollOutcome::Terminal(job))
    }
}

async fn run_session<T, F>(
    source: Arc<dyn JobStatusSource>,
    policy: PollPolicy,
    job_id: EntityId,
    mut callbacks: Callbacks<T, F>,
    mut cancel_rx: watch::Receiver<bool>,
) -> PollOutcome
where
    T: FnMut(&Job) + Send + 'static,
    F: FnOnce(&Job) + Send + 'static,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let response = tokio::select! {
            biased;
            _ = cancellation(&mut cancel_rx) => return PollOutcome::Cancelled,
            response = source.job_status(&job_id) => response,
        };

        if let Some(outcome) = callbacks.deliver(&job_id, attempt, &policy, response) {
            return outcome;
        }

        if policy.exhausted(attempt) {
            tracing::warn!(
                job_id = %job_id,
                attempts = attempt,
                "Job still not terminal, giving up"
            );
            return PollOutcome::Exhausted { attempts: attempt };
        }

        let delay = policy.delay_after(attempt);
        tokio::select! {
            biased;
            _ = cancellation(&mut cancel_rx) => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Resolves once the session is cancelled or its handle is gone
async fn cancellation(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            return;
        }
    }
}
