//! Integration tests for job polling
//!
//! Timing tests run on a paused Tokio clock; the HTTP test uses a real
//! client against a mock server.

use async_trait::async_trait;
use caredesk::adapters::api::{ApiClient, JobStatusSource};
use caredesk::adapters::storage::MemoryStorage;
use caredesk::config::{ApiConfig, SessionConfig};
use caredesk::core::context::{SharedContextStore, Transition};
use caredesk::core::polling::{JobPoller, PollHandle, PollOutcome, PollPolicy};
use caredesk::domain::{ApiError, EntityId, Job, JobStatus, PollError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Replays a fixed list of statuses, repeating the last one
struct Script {
    statuses: Mutex<VecDeque<&'static str>>,
    calls: AtomicU32,
}

impl Script {
    fn new(statuses: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStatusSource for Script {
    async fn job_status(&self, job_id: &EntityId) -> Result<Job, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                *statuses.front().unwrap()
            }
        };
        Ok(serde_json::from_value(serde_json::json!({
            "id": job_id.as_str(),
            "status": status,
        }))
        .unwrap())
    }
}

fn job_id(value: &str) -> EntityId {
    EntityId::new(value).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_backoff_schedule() {
    let script = Script::new(&["queued", "running", "running", "running", "succeeded"]);
    let policy = PollPolicy {
        backoff_multiplier: 2.0,
        max_interval: Duration::from_millis(2000),
        ..PollPolicy::fixed(Duration::from_millis(500))
    };
    let poller = JobPoller::new(script.clone(), policy);

    let start = Instant::now();
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let tick_log = Arc::clone(&ticks);
    let handle = poller.poll(
        job_id("job-1"),
        move |_job| tick_log.lock().unwrap().push(start.elapsed().as_millis()),
        |_| {},
    );

    let outcome = handle.wait().await;
    assert!(matches!(outcome, PollOutcome::Terminal(ref job) if job.status == JobStatus::Succeeded));
    // 500, 1000, 2000, then capped at 2000
    assert_eq!(ticks.lock().unwrap().as_slice(), &[0, 500, 1500, 3500, 5500]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_is_terminal() {
    let script = Script::new(&["running", "failed"]);
    let poller = JobPoller::new(script.clone(), PollPolicy::default());
    let terminal = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&terminal);

    let outcome = poller
        .poll(job_id("job-2"), |_| {}, move |job| {
            *slot.lock().unwrap() = Some(job.status.clone())
        })
        .wait()
        .await;

    assert_eq!(*terminal.lock().unwrap(), Some(JobStatus::Failed));
    assert_eq!(script.calls(), 2);
    assert!(outcome.into_result(&job_id("job-2")).unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_attempt_cap_reports_exhaustion() {
    let script = Script::new(&["running"]);
    let terminal_calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&terminal_calls);
    let poller = JobPoller::new(
        script.clone(),
        PollPolicy::fixed(Duration::from_millis(750)).with_max_attempts(Some(4)),
    );

    let outcome = poller
        .poll(job_id("job-3"), |_| {}, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .wait()
        .await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 4 });
    assert_eq!(script.calls(), 4);
    assert_eq!(terminal_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        outcome.into_result(&job_id("job-3")),
        Err(PollError::AttemptsExhausted {
            job_id: "job-3".to_string(),
            attempts: 4
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_ticks() {
    let script = Script::new(&["running"]);
    let poller = JobPoller::new(script.clone(), PollPolicy::fixed(Duration::from_millis(750)));
    let ticks = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&ticks);

    let handle = poller.poll(
        job_id("job-4"),
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        |_| {},
    );

    tokio::time::sleep(Duration::from_millis(1600)).await;
    handle.cancel();
    let seen = ticks.load(Ordering::SeqCst);
    assert_eq!(seen, 3);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
    assert_eq!(handle.wait().await, PollOutcome::Cancelled);
}

#[tokio::test]
async fn test_polls_job_endpoint_over_http() {
    let mut server = mockito::Server::new_async().await;
    let status = server
        .mock("GET", "/jobs/job-5")
        .with_status(200)
        .with_body(r#"{"id":"job-5","status":"succeeded","progress":100}"#)
        .expect(1)
        .create_async()
        .await;

    let api = ApiClient::new(&ApiConfig {
        base_url: server.url(),
        timeout_seconds: 5,
        connect_timeout_seconds: 5,
    })
    .unwrap();
    let poller = JobPoller::new(Arc::new(api), PollPolicy::fixed(Duration::from_millis(50)));

    let ticks = Arc::new(Mutex::new(Vec::new()));
    let tick_log = Arc::clone(&ticks);
    let handle = poller.poll(
        job_id("job-5"),
        move |job| tick_log.lock().unwrap().push(job.progress),
        |_| {},
    );

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .unwrap();
    assert_eq!(outcome.terminal_job().map(|job| job.progress), Some(100));
    assert_eq!(ticks.lock().unwrap().as_slice(), &[100]);
    status.assert_async().await;
}

#[tokio::test]
async fn test_http_error_ends_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/jobs/job-6")
        .with_status(404)
        .with_body(r#"{"detail":"Job not found"}"#)
        .create_async()
        .await;

    let api = ApiClient::new(&ApiConfig {
        base_url: server.url(),
        timeout_seconds: 5,
        connect_timeout_seconds: 5,
    })
    .unwrap();
    let poller = JobPoller::new(Arc::new(api), PollPolicy::fixed(Duration::from_millis(50)));

    let outcome = poller.poll(job_id("job-6"), |_| {}, |_| {}).wait().await;
    match outcome {
        PollOutcome::Failed(e) => assert_eq!(e.to_string(), "404 Not Found: \"Job not found\""),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_context_listener_cancels_session_from_terminal_callback() {
    let store = Arc::new(SharedContextStore::open(
        Arc::new(MemoryStorage::new()),
        &SessionConfig::default(),
        "Dr. Sample User",
    ));
    store.dispatch(Transition::SetPatient(EntityId::new("pat-1").ok()));
    store.dispatch(Transition::SetJob(EntityId::new("job-7").ok()));

    // The consumer tears its session down once the context moves off its job
    let slot: Arc<Mutex<Option<PollHandle>>> = Arc::new(Mutex::new(None));
    let owner = Arc::clone(&slot);
    let _subscription = store.subscribe(move |state| {
        if state.job_id != EntityId::new("job-7").ok() {
            if let Some(handle) = owner.lock().unwrap().as_ref() {
                handle.cancel();
            }
        }
    });

    let script = Script::new(&["running", "succeeded"]);
    let poller = JobPoller::new(script.clone(), PollPolicy::fixed(Duration::from_millis(50)));
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let terminal_store = Arc::clone(&store);
    let handle = poller.poll(job_id("job-7"), |_| {}, move |_| {
        terminal_store.dispatch(Transition::SetJob(None));
        let _ = done_tx.send(());
    });
    *slot.lock().unwrap() = Some(handle);

    tokio::time::timeout(Duration::from_secs(3), done_rx)
        .await
        .expect("terminal callback returned")
        .unwrap();
    let handle = slot.lock().unwrap().take().unwrap();
    assert!(handle.is_cancelled());

    let outcome = tokio::time::timeout(Duration::from_secs(3), handle.wait())
        .await
        .expect("session ended");
    assert!(matches!(outcome, PollOutcome::Terminal(ref job) if job.status == JobStatus::Succeeded));
    assert_eq!(script.calls(), 2);
    assert_eq!(store.get_state().job_id, None);
}
