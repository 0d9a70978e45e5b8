use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{
    clamp_resume_score, Application, ApplicationId, ApplicationSubmission, StatusChange,
};
use super::filter::{apply_filters, ApplicationFilter};
use super::repository::ApplicationRepository;
use super::transitions::{ApplicationStatus, StatusTransition};
use crate::workflows::access::{authorize, RequestContext};
use crate::workflows::jobs::{Job, JobId, JobRepository};
use crate::workflows::WorkflowError;

static APPLICATION_SEQUENCE: AtomicI64 = AtomicI64::new(1);

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Result of a status change: the updated application and the audit entry written with it.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub application: Application,
    pub change: StatusChange,
}

/// Load an application together with its job, enforcing job-level access.
pub(crate) fn load_authorized<S>(
    store: &S,
    ctx: &RequestContext,
    id: ApplicationId,
) -> Result<(Application, Job), WorkflowError>
where
    S: JobRepository + ApplicationRepository + ?Sized,
{
    let application = store
        .fetch_application(id)?
        .ok_or_else(|| WorkflowError::not_found("application", id.0))?;
    let job = store
        .fetch_job(application.job_id)?
        .ok_or_else(|| WorkflowError::not_found("job", application.job_id.0))?;
    authorize(ctx, &job.scope())?;
    Ok((application, job))
}

/// Validate and persist a status move. Nothing is written when the move is not allowed.
pub(crate) fn record_transition<S>(
    store: &S,
    ctx: &RequestContext,
    application: &Application,
    job: &Job,
    target: ApplicationStatus,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<StatusUpdate, WorkflowError>
where
    S: ApplicationRepository + ?Sized,
{
    let transition = application
        .status
        .transition_to(target)
        .map_err(|err| WorkflowError::validation(err.to_string()))?;

    let note = note
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| transition.default_note(&application.candidate.name, &job.title));

    let change = StatusChange {
        from: application.status,
        to: target,
        note,
        changed_by: ctx.user_id,
        changed_at: now,
    };
    let updated = store.apply_status_change(application.id, change.clone())?;

    info!(
        application_id = application.id.0,
        job_id = job.id.0,
        from = %change.from,
        to = %change.to,
        changed_by = ctx.user_id.0,
        "application status changed"
    );

    Ok(StatusUpdate {
        application: updated,
        change,
    })
}

/// Service driving applications through the hiring pipeline.
pub struct PipelineService<S> {
    store: Arc<S>,
}

impl<S> PipelineService<S>
where
    S: JobRepository + ApplicationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Accept a candidate's application to an active job.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<Application, WorkflowError> {
        let job = self
            .store
            .fetch_job(submission.job_id)?
            .ok_or_else(|| WorkflowError::not_found("job", submission.job_id.0))?;
        if !job.status.accepts_applications() {
            return Err(WorkflowError::validation(format!(
                "job {} is {} and not accepting applications",
                job.id.0,
                job.status.label()
            )));
        }

        let mut candidate = submission.candidate;
        candidate.name = candidate.name.trim().to_string();
        candidate.email = candidate.email.trim().to_string();
        if candidate.name.is_empty() {
            return Err(WorkflowError::validation("candidate name is required"));
        }
        if !candidate.email.contains('@') {
            return Err(WorkflowError::validation(
                "a valid candidate email is required",
            ));
        }

        let duplicate = self
            .store
            .applications_for_job(job.id)?
            .iter()
            .any(|existing| existing.candidate.email.eq_ignore_ascii_case(&candidate.email));
        if duplicate {
            return Err(WorkflowError::validation(format!(
                "{} has already applied to this job",
                candidate.email
            )));
        }

        let application = Application {
            id: next_application_id(),
            job_id: job.id,
            candidate,
            status: ApplicationStatus::Submitted,
            resume_score: clamp_resume_score(submission.resume_score),
            applied_at: now,
            updated_at: now,
        };

        let stored = self.store.insert_application(application)?;
        info!(
            application_id = stored.id.0,
            job_id = stored.job_id.0,
            resume_score = stored.resume_score,
            "application submitted"
        );
        Ok(stored)
    }

    pub fn get(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
    ) -> Result<Application, WorkflowError> {
        load_authorized(self.store.as_ref(), ctx, id).map(|(application, _)| application)
    }

    /// Move an application to `target`, writing `note` or the default note to the audit trail.
    pub fn change_status(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
        target: ApplicationStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<StatusUpdate, WorkflowError> {
        let (application, job) = load_authorized(self.store.as_ref(), ctx, id)?;
        record_transition(self.store.as_ref(), ctx, &application, &job, target, note, now)
    }

    pub fn history(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
    ) -> Result<Vec<StatusChange>, WorkflowError> {
        load_authorized(self.store.as_ref(), ctx, id)?;
        Ok(self.store.status_history(id)?)
    }

    pub fn available_actions(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
    ) -> Result<Vec<StatusTransition>, WorkflowError> {
        let (application, _) = load_authorized(self.store.as_ref(), ctx, id)?;
        Ok(application.status.available_actions())
    }

    pub fn list_for_job(
        &self,
        ctx: &RequestContext,
        job_id: JobId,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, WorkflowError> {
        let job = self
            .store
            .fetch_job(job_id)?
            .ok_or_else(|| WorkflowError::not_found("job", job_id.0))?;
        authorize(ctx, &job.scope())?;

        let mut applications = self.store.applications_for_job(job_id)?;
        applications.sort_by_key(|application| application.id);
        Ok(apply_filters(&applications, filter))
    }
}
