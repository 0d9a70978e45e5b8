use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::{ApplicationId, ApplicationSubmission};
use super::filter::ApplicationFilter;
use super::repository::ApplicationRepository;
use super::service::PipelineService;
use super::transitions::ApplicationStatus;
use crate::workflows::access::RequestContext;
use crate::workflows::jobs::{JobId, JobRepository};
use crate::workflows::outcome::respond;
use crate::workflows::request::{ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    pub(crate) status: ApplicationStatus,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

/// Router builder exposing intake, review, and list endpoints for applications.
pub fn pipeline_router<S>(service: Arc<PipelineService<S>>) -> Router
where
    S: JobRepository + ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/history",
            get(history_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/actions",
            get(actions_handler::<S>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(list_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ApiJson(submission): ApiJson<ApplicationSubmission>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.submit(submission, Utc::now()),
        StatusCode::CREATED,
        "application submitted",
    )
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ctx: RequestContext,
    ApiPath(application_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.get(&ctx, ApplicationId(application_id)),
        StatusCode::OK,
        "application loaded",
    )
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ctx: RequestContext,
    ApiPath(application_id): ApiPath<i64>,
    ApiJson(request): ApiJson<StatusChangeRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.change_status(
            &ctx,
            ApplicationId(application_id),
            request.status,
            request.note,
            Utc::now(),
        ),
        StatusCode::OK,
        "application status updated",
    )
}

pub(crate) async fn history_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ctx: RequestContext,
    ApiPath(application_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.history(&ctx, ApplicationId(application_id)),
        StatusCode::OK,
        "status history loaded",
    )
}

pub(crate) async fn actions_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ctx: RequestContext,
    ApiPath(application_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.available_actions(&ctx, ApplicationId(application_id)),
        StatusCode::OK,
        "available actions loaded",
    )
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<PipelineService<S>>>,
    ctx: RequestContext,
    ApiPath(job_id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
) -> Response
where
    S: JobRepository + ApplicationRepository + 'static,
{
    respond(
        service.list_for_job(&ctx, JobId(job_id), &filter),
        StatusCode::OK,
        "applications loaded",
    )
}
