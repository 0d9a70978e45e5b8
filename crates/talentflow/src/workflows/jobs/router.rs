use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::{JobDraft, JobId, JobStatus};
use super::repository::{JobRepository, RecruiterDirectory};
use super::service::JobService;
use crate::workflows::access::{RecruiterEdit, RequestContext};
use crate::workflows::outcome::respond;
use crate::workflows::request::{ApiJson, ApiPath};

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecruiterEditRequest {
    pub(crate) edits: Vec<RecruiterEdit>,
}

/// Router builder exposing job posting and recruiter access endpoints.
pub fn job_router<S>(service: Arc<JobService<S>>) -> Router
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/jobs/:job_id", get(get_handler::<S>))
        .route("/api/v1/jobs/:job_id/status", put(status_handler::<S>))
        .route(
            "/api/v1/jobs/:job_id/recruiters",
            get(recruiters_handler::<S>).patch(update_recruiters_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
    ApiJson(draft): ApiJson<JobDraft>,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(
        service.create(&ctx, draft, Utc::now()),
        StatusCode::CREATED,
        "job created",
    )
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(service.list(&ctx), StatusCode::OK, "jobs loaded")
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
    ApiPath(job_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(service.get(&ctx, JobId(job_id)), StatusCode::OK, "job loaded")
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
    ApiPath(job_id): ApiPath<i64>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(
        service.set_status(&ctx, JobId(job_id), request.status, Utc::now()),
        StatusCode::OK,
        "job status updated",
    )
}

pub(crate) async fn recruiters_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
    ApiPath(job_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(
        service.recruiter_access(&ctx, JobId(job_id)),
        StatusCode::OK,
        "recruiter access loaded",
    )
}

pub(crate) async fn update_recruiters_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    ctx: RequestContext,
    ApiPath(job_id): ApiPath<i64>,
    ApiJson(request): ApiJson<RecruiterEditRequest>,
) -> Response
where
    S: JobRepository + RecruiterDirectory + 'static,
{
    respond(
        service.update_recruiters(&ctx, JobId(job_id), &request.edits, Utc::now()),
        StatusCode::OK,
        "recruiter access updated",
    )
}
