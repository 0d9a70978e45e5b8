use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::store::{InMemoryStore, RepositoryError};
use crate::workflows::access::{
    OrganizationId, Recruiter, RequestContext, Role, UserId, ORGANIZATION_ID_HEADER, ROLE_HEADER,
    USER_ID_HEADER,
};
use crate::workflows::jobs::{Job, JobDraft, JobId, JobRepository, JobService, JobStatus};
use crate::workflows::pipeline::{
    Application, ApplicationId, ApplicationRepository, ApplicationSubmission, CandidateProfile,
    PipelineService, StatusChange,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 9, 0, 0).unwrap()
}

pub(super) fn owner() -> RequestContext {
    RequestContext::new(5, 10, Role::Hr)
}

pub(super) fn job_draft(status: JobStatus) -> JobDraft {
    JobDraft {
        title: "Backend Engineer".to_string(),
        department: Some("Engineering".to_string()),
        description: "Own the hiring API".to_string(),
        location: Some("Remote".to_string()),
        compensation: None,
        status: Some(status),
    }
}

pub(super) fn candidate(name: &str, email: &str) -> CandidateProfile {
    CandidateProfile {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        department: None,
        skills: vec!["rust".to_string()],
    }
}

pub(super) fn submission(
    job_id: JobId,
    name: &str,
    email: &str,
    score: i32,
) -> ApplicationSubmission {
    ApplicationSubmission {
        job_id,
        candidate: candidate(name, email),
        resume_score: Some(score),
    }
}

pub(super) struct Harness {
    pub(super) store: Arc<InMemoryStore>,
    pub(super) jobs: JobService<InMemoryStore>,
    pub(super) service: Arc<PipelineService<InMemoryStore>>,
    pub(super) job: Job,
}

/// Store with one active job owned by user 5 of organization 10.
pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::default());
    store.seed_recruiters(
        OrganizationId(10),
        vec![
            Recruiter {
                id: UserId(5),
                name: "Olivia Owner".to_string(),
                email: "olivia@acme.test".to_string(),
                role: Role::Hr,
            },
            Recruiter {
                id: UserId(7),
                name: "Rita Recruiter".to_string(),
                email: "rita@acme.test".to_string(),
                role: Role::Hr,
            },
        ],
    );
    let jobs = JobService::new(store.clone());
    let job = jobs
        .create(&owner(), job_draft(JobStatus::Active), now())
        .expect("job created");
    let service = Arc::new(PipelineService::new(store.clone()));

    Harness {
        store,
        jobs,
        service,
        job,
    }
}

impl Harness {
    pub(super) fn apply(&self, name: &str, email: &str, score: i32) -> Application {
        self.service
            .submit(submission(self.job.id, name, email, score), now())
            .expect("application submitted")
    }
}

pub(super) fn request(
    method: &str,
    uri: &str,
    ctx: Option<&RequestContext>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ctx) = ctx {
        builder = builder
            .header(USER_ID_HEADER, ctx.user_id.0.to_string())
            .header(ORGANIZATION_ID_HEADER, ctx.organization_id.0.to_string())
            .header(ROLE_HEADER, ctx.role.label());
    }
    match body {
        Some(json) => builder
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}

/// Store whose every call fails as if the database were offline.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn update_job(&self, _job: Job) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_job(&self, _id: JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn jobs_for_organization(
        &self,
        _organization: OrganizationId,
    ) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn applications_for_job(&self, _job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn apply_status_change(
        &self,
        _id: ApplicationId,
        _change: StatusChange,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn status_history(&self, _id: ApplicationId) -> Result<Vec<StatusChange>, RepositoryError> {
        offline()
    }
}

/// Reads succeed against a real store; status writes are refused.
pub(super) struct FrozenStatusStore(pub(super) Arc<InMemoryStore>);

impl JobRepository for FrozenStatusStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.0.insert_job(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        self.0.update_job(job)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.0.fetch_job(id)
    }

    fn jobs_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Job>, RepositoryError> {
        self.0.jobs_for_organization(organization)
    }
}

impl ApplicationRepository for FrozenStatusStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        self.0.insert_application(application)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.0.fetch_application(id)
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        self.0.applications_for_job(job_id)
    }

    fn apply_status_change(
        &self,
        _id: ApplicationId,
        _change: StatusChange,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn status_history(&self, id: ApplicationId) -> Result<Vec<StatusChange>, RepositoryError> {
        self.0.status_history(id)
    }
}
