//! End-to-end flows through a session: pages, module outputs, submission

use caredesk::adapters::api::ApiClient;
use caredesk::adapters::storage::MemoryStorage;
use caredesk::cli::panel::headless_registry;
use caredesk::config::{ApiConfig, SessionConfig};
use caredesk::core::context::{SharedContextStore, Transition};
use caredesk::core::modules::{HostOutcome, ModuleId};
use caredesk::core::pages::{Page, PageState};
use caredesk::core::polling::{PollOutcome, PollPolicy};
use caredesk::core::session::Session;
use caredesk::core::workflow::{submit_and_track, sync_preauth_selection};
use caredesk::domain::{EntityId, SubmissionMode};
use std::sync::Arc;
use std::time::Duration;

fn id(value: &str) -> Option<EntityId> {
    EntityId::new(value).ok()
}

fn session(base_url: String) -> Session {
    let store = Arc::new(SharedContextStore::open(
        Arc::new(MemoryStorage::new()),
        &SessionConfig::default(),
        "Dr. Sample User",
    ));
    let api = ApiClient::new(&ApiConfig {
        base_url,
        timeout_seconds: 5,
        connect_timeout_seconds: 5,
    })
    .unwrap();
    Session::new(
        store,
        headless_registry(true).unwrap(),
        api,
        PollPolicy::fixed(Duration::from_millis(20)),
    )
}

fn mounted(outcomes: &[HostOutcome]) -> Vec<ModuleId> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            HostOutcome::Mounted { module, .. } => Some(*module),
            _ => None,
        })
        .collect()
}

#[test]
fn test_workspace_gates_until_patient_selected() {
    let session = session("http://localhost:8000".to_string());
    let mut state = PageState::default();

    let outcomes = session.render_page(Page::Workspace, &mut state);
    assert_eq!(mounted(&outcomes), vec![ModuleId::ClinicalEventDetailDrawer]);
    assert_eq!(
        outcomes[0].placeholder().as_deref(),
        Some("Missing context: patientId")
    );

    session.dispatch(Transition::SetPatient(id("pat-1")));
    let outcomes = session.render_page(Page::Workspace, &mut state);
    assert_eq!(
        mounted(&outcomes),
        vec![
            ModuleId::PatientSummaryCard,
            ModuleId::TimelineList,
            ModuleId::ClinicalEventDetailDrawer
        ]
    );
}

#[test]
fn test_preauth_selection_output_updates_context() {
    let session = session("http://localhost:8000".to_string());
    session.dispatch(Transition::SetPatient(id("pat-1")));
    session.dispatch(Transition::SetJob(id("job-old")));

    let mut state = PageState::default();
    for transition in Page::PreAuth.handle_output(
        ModuleId::PreAuthHistoryList,
        &serde_json::json!({ "selectedPreAuthId": "pa-1" }),
        &mut state,
    ) {
        session.dispatch(transition);
    }

    let context = session.context();
    assert_eq!(context.pre_auth_id, id("pa-1"));
    assert_eq!(context.job_id, None);
    assert_eq!(state.refresh, 1);

    let outcomes = session.render_page(Page::PreAuth, &mut state);
    let modules = mounted(&outcomes);
    assert!(modules.contains(&ModuleId::DecisionPanel));
    assert!(modules.contains(&ModuleId::SubmitButtonWithJobStatus));
    assert!(!modules.contains(&ModuleId::RequestedDocumentUploader));
}

#[tokio::test]
async fn test_document_request_then_resubmission() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/preauth/pa-1")
        .with_status(200)
        .with_body(r#"{"id":"pa-1","patientId":"pat-1","encounterId":"enc-3","status":"pending-info"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/preauth/pa-1/latest-decision")
        .with_status(200)
        .with_body(
            r#"{"id":"dec-1","outcome":"pending-info","requestedAdditionalInfo":[{"code":"chest-x-ray"}]}"#,
        )
        .create_async()
        .await;
    let resubmit = server
        .mock("POST", "/preauth/pa-1/resubmit")
        .with_status(202)
        .with_body(r#"{"jobId":"job-77","mode":"resubmit"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/jobs/job-77")
        .with_status(200)
        .with_body(r#"{"id":"job-77","status":"succeeded","progress":100}"#)
        .create_async()
        .await;

    let session = session(server.url());
    session.dispatch(Transition::SetPatient(id("pat-1")));
    session.dispatch(Transition::SetPreAuth(id("pa-1")));

    let mut state = PageState::default();
    sync_preauth_selection(&session, &mut state).await.unwrap();
    assert!(state.document_requested);
    assert_eq!(session.context().encounter_id, id("enc-3"));

    let outcomes = session.render_page(Page::PreAuth, &mut state);
    assert!(mounted(&outcomes).contains(&ModuleId::RequestedDocumentUploader));

    let report = submit_and_track(&session, &EntityId::new("pa-1").unwrap(), |_| {})
        .await
        .unwrap();
    resubmit.assert_async().await;
    assert_eq!(report.mode, SubmissionMode::Resubmit);
    assert!(matches!(report.outcome, PollOutcome::Terminal(_)));
    assert!(report.decision.is_some());

    // The new job is visible to every page
    assert_eq!(session.context().job_id, id("job-77"));
    let outcomes = session.render_page(Page::Workspace, &mut PageState::default());
    assert!(mounted(&outcomes).contains(&ModuleId::JobDetailPanel));
}
