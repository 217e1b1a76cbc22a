//! Pre-authorization workflows that span the API, the shared context and polling

use crate::core::context::Transition;
use crate::core::events::AppEvent;
use crate::core::pages::PageState;
use crate::core::polling::PollOutcome;
use crate::core::session::Session;
use crate::domain::{
    ApiError, CaredeskError, Decision, EntityId, Job, JobSubmission, PreAuth, Result,
    SubmissionMode,
};

/// What happened to one submission
#[derive(Debug)]
pub struct SubmissionReport {
    /// The request as read before submitting
    pub pre_auth: PreAuth,
    pub mode: SubmissionMode,
    pub job_id: EntityId,
    pub outcome: PollOutcome,
    /// Latest decision after the job finished; `None` when there is none yet
    /// or the job did not reach a terminal status
    pub decision: Option<Decision>,
}

impl SubmissionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome
            .terminal_job()
            .is_some_and(|job| job.status == crate::domain::JobStatus::Succeeded)
    }
}

/// Submit (or resubmit) a pre-authorization and follow its job to the end
///
/// The job id is published to the shared context before polling starts, so
/// any page showing job details picks it up immediately.
///
/// # Errors
///
/// Returns a validation error if the request is not in a submittable status,
/// and an API error if reading, submitting or fetching the decision fails.
/// Poll failures are reported in [`SubmissionReport::outcome`].
pub async fn submit_and_track<T>(
    session: &Session,
    pre_auth_id: &EntityId,
    on_tick: T,
) -> Result<SubmissionReport>
where
    T: FnMut(&Job) + Send + 'static,
{
    let pre_auth = session.api().get_preauth(pre_auth_id).await?;
    if !pre_auth.can_submit() {
        return Err(CaredeskError::Validation(format!(
            "Pre-authorization {pre_auth_id} cannot be submitted from status '{}'",
            pre_auth.status
        )));
    }

    let mode = pre_auth.submission_mode();
    let correlation_id = session.context().correlation_id.clone();
    tracing::info!(
        pre_auth_id = %pre_auth_id,
        mode = mode.endpoint(),
        correlation_id = %correlation_id,
        "Submitting pre-authorization"
    );

    let submission = session
        .api()
        .submit_preauth(pre_auth_id, mode, &correlation_id)
        .await?;

    let (job_id, outcome, decision) = track(session, pre_auth_id, &submission, on_tick).await?;

    Ok(SubmissionReport {
        pre_auth,
        mode,
        job_id,
        outcome,
        decision,
    })
}

/// Re-queue payer review for a submitted request and follow the job
///
/// # Errors
///
/// Returns a validation error if the request already has a decision or has
/// not been submitted, and an API error if a request fails.
pub async fn enqueue_review_and_track<T>(
    session: &Session,
    pre_auth_id: &EntityId,
    on_tick: T,
) -> Result<(EntityId, PollOutcome, Option<Decision>)>
where
    T: FnMut(&Job) + Send + 'static,
{
    let pre_auth = session.api().get_preauth(pre_auth_id).await?;
    if !pre_auth.can_enqueue_review() {
        return Err(CaredeskError::Validation(format!(
            "Pre-authorization {pre_auth_id} cannot be queued for review from status '{}'",
            pre_auth.status
        )));
    }

    let correlation_id = session.context().correlation_id.clone();
    let submission = session
        .api()
        .enqueue_review(pre_auth_id, &correlation_id)
        .await?;

    track(session, pre_auth_id, &submission, on_tick).await
}

async fn track<T>(
    session: &Session,
    pre_auth_id: &EntityId,
    submission: &JobSubmission,
    on_tick: T,
) -> Result<(EntityId, PollOutcome, Option<Decision>)>
where
    T: FnMut(&Job) + Send + 'static,
{
    let job_id = EntityId::new(submission.job_id.as_str()).map_err(|message| {
        CaredeskError::Api(ApiError::InvalidResponse {
            path: format!("/preauth/{pre_auth_id}"),
            message,
        })
    })?;

    session.dispatch(Transition::SetJob(Some(job_id.clone())));
    session.bus().publish(&AppEvent::JobIdChanged {
        job_id: Some(job_id.clone()),
    });

    let outcome = session
        .poller()
        .poll(job_id.clone(), on_tick, |_| {})
        .wait()
        .await;

    let decision = match &outcome {
        PollOutcome::Terminal(job) => {
            tracing::info!(job_id = %job_id, status = %job.status, "Job finished");
            session.api().latest_decision(pre_auth_id).await?
        }
        other => {
            tracing::warn!(job_id = %job_id, outcome = ?other, "Job not tracked to completion");
            None
        }
    };

    Ok((job_id, outcome, decision))
}

/// Bring the pre-auth page in line with the selected request
///
/// Copies the request's encounter into the shared context and records whether
/// the latest decision asks for a document, which shows the uploader slot.
/// Does nothing when no pre-authorization is selected.
///
/// # Errors
///
/// Returns an API error if the request or its decision cannot be read.
pub async fn sync_preauth_selection(session: &Session, state: &mut PageState) -> Result<()> {
    let Some(pre_auth_id) = session.context().pre_auth_id.clone() else {
        state.document_requested = false;
        return Ok(());
    };

    let pre_auth = session.api().get_preauth(&pre_auth_id).await?;
    if let Some(encounter_id) = EntityId::parse_optional(pre_auth.encounter_id.as_deref()) {
        session.dispatch(Transition::SetEncounter(Some(encounter_id)));
    }

    let decision = session.api().latest_decision(&pre_auth_id).await?;
    state.document_requested = decision.as_ref().is_some_and(Decision::requests_document);
    Ok(())
}
