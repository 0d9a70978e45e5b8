use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use talentflow::config::WorkflowConfig;
use talentflow::workflows::api_router;
use talentflow::workflows::assessment::AssessmentRepository;
use talentflow::workflows::jobs::{JobRepository, RecruiterDirectory};
use talentflow::workflows::pipeline::ApplicationRepository;

/// Workflow API plus the operational endpoints.
pub(crate) fn with_platform_routes<S>(store: Arc<S>, config: &WorkflowConfig) -> Router
where
    S: JobRepository + RecruiterDirectory + ApplicationRepository + AssessmentRepository + 'static,
{
    api_router(store, config)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
