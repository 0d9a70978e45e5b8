use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{Job, JobDraft, JobId, JobStatus};
use super::repository::{JobRepository, RecruiterDirectory};
use crate::workflows::access::{
    authorize, is_authorized, locked_recruiters, partition_recruiters, RecruiterAccessSet,
    RecruiterEdit, RecruiterPartition, RequestContext, UserId,
};
use crate::workflows::WorkflowError;

static JOB_SEQUENCE: AtomicI64 = AtomicI64::new(1);

fn next_job_id() -> JobId {
    JobId(JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Recruiter partition of one job as seen by the current requester.
#[derive(Debug, Clone, Serialize)]
pub struct RecruiterAccessView {
    pub job_id: JobId,
    #[serde(flatten)]
    pub partition: RecruiterPartition,
}

/// Service owning job postings and their recruiter assignments.
pub struct JobService<S> {
    store: Arc<S>,
}

impl<S> JobService<S>
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open a job. The creator is assigned to it and stays locked there.
    pub fn create(
        &self,
        ctx: &RequestContext,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<Job, WorkflowError> {
        if !ctx.role.manages_hiring() {
            return Err(WorkflowError::Unauthorized);
        }

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(WorkflowError::validation("job title is required"));
        }
        if let Some(pay) = &draft.compensation {
            if pay.min > pay.max {
                return Err(WorkflowError::validation(format!(
                    "compensation minimum {} exceeds maximum {}",
                    pay.min, pay.max
                )));
            }
        }
        if draft.status == Some(JobStatus::Closed) {
            return Err(WorkflowError::validation(
                "a job cannot be created in the Closed state",
            ));
        }

        let job = Job {
            id: next_job_id(),
            organization_id: ctx.organization_id,
            created_by: ctx.user_id,
            status: draft.status.unwrap_or(JobStatus::Draft),
            assigned_recruiters: BTreeSet::from([ctx.user_id]),
            title: title.to_string(),
            department: draft.department,
            description: draft.description,
            location: draft.location,
            compensation: draft.compensation,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert_job(job)?;
        info!(
            job_id = stored.id.0,
            organization_id = stored.organization_id.0,
            status = stored.status.label(),
            "job created"
        );
        Ok(stored)
    }

    pub fn get(&self, ctx: &RequestContext, id: JobId) -> Result<Job, WorkflowError> {
        let job = self.load(id)?;
        authorize(ctx, &job.scope())?;
        Ok(job)
    }

    /// Jobs in the requester's organization that the requester may act on.
    pub fn list(&self, ctx: &RequestContext) -> Result<Vec<Job>, WorkflowError> {
        let mut jobs: Vec<Job> = self
            .store
            .jobs_for_organization(ctx.organization_id)?
            .into_iter()
            .filter(|job| is_authorized(Some(ctx), &job.scope()))
            .collect();
        jobs.sort_by_key(|job| job.id);
        Ok(jobs)
    }

    pub fn set_status(
        &self,
        ctx: &RequestContext,
        id: JobId,
        status: JobStatus,
        now: DateTime<Utc>,
    ) -> Result<Job, WorkflowError> {
        let mut job = self.load(id)?;
        authorize(ctx, &job.scope())?;

        if job.status == JobStatus::Closed && status != JobStatus::Closed {
            return Err(WorkflowError::validation("closed jobs cannot be reopened"));
        }

        let previous = job.status;
        job.status = status;
        job.updated_at = now;
        self.store.update_job(job.clone())?;

        info!(
            job_id = job.id.0,
            from = previous.label(),
            to = status.label(),
            "job status changed"
        );
        Ok(job)
    }

    pub fn recruiter_access(
        &self,
        ctx: &RequestContext,
        id: JobId,
    ) -> Result<RecruiterAccessView, WorkflowError> {
        let job = self.load(id)?;
        authorize(ctx, &job.scope())?;
        self.view(&job, ctx)
    }

    /// Apply recruiter edits. Only the owner or an OrgAdmin may change access.
    pub fn update_recruiters(
        &self,
        ctx: &RequestContext,
        id: JobId,
        edits: &[RecruiterEdit],
        now: DateTime<Utc>,
    ) -> Result<RecruiterAccessView, WorkflowError> {
        let mut job = self.load(id)?;
        authorize(ctx, &job.scope().owner_only())?;

        if edits.is_empty() {
            return Err(WorkflowError::validation("no recruiter changes supplied"));
        }

        let directory: BTreeSet<UserId> = self
            .store
            .recruiters(job.organization_id)?
            .into_iter()
            .map(|recruiter| recruiter.id)
            .collect();
        let locked = locked_recruiters(job.created_by, ctx);
        // Ids already on the job may have left the directory; they can still be dropped.
        if let Some(unknown) = edits
            .iter()
            .flat_map(RecruiterEdit::referenced_ids)
            .find(|id| {
                !directory.contains(id)
                    && !locked.contains(id)
                    && !job.assigned_recruiters.contains(id)
            })
        {
            return Err(WorkflowError::validation(format!(
                "user {} is not a recruiter in this organization",
                unknown.0
            )));
        }

        let mut access = RecruiterAccessSet::new(job.assigned_recruiters.clone(), locked);
        access
            .apply(edits)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;

        job.assigned_recruiters = access.into_assigned();
        job.updated_at = now;
        self.store.update_job(job.clone())?;

        info!(
            job_id = job.id.0,
            assigned = job.assigned_recruiters.len(),
            "job recruiters updated"
        );
        self.view(&job, ctx)
    }

    fn view(&self, job: &Job, ctx: &RequestContext) -> Result<RecruiterAccessView, WorkflowError> {
        let all = self.store.recruiters(job.organization_id)?;
        let locked = locked_recruiters(job.created_by, ctx);
        Ok(RecruiterAccessView {
            job_id: job.id,
            partition: partition_recruiters(&all, &job.assigned_recruiters, &locked),
        })
    }

    fn load(&self, id: JobId) -> Result<Job, WorkflowError> {
        self.store
            .fetch_job(id)?
            .ok_or_else(|| WorkflowError::not_found("job", id.0))
    }
}
