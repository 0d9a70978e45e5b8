use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::{
    deserialize_raw_mark, AssignmentId, AssignmentRequest, AttemptId, MarkEdit, ProctoringEvent,
    QuestionDraft, ResponseId, SubmittedAnswer, TestDraft, TestId,
};
use super::marks::GradingService;
use super::repository::AssessmentRepository;
use super::service::AssessmentService;
use crate::workflows::access::RequestContext;
use crate::workflows::jobs::JobRepository;
use crate::workflows::outcome::respond;
use crate::workflows::request::{ApiJson, ApiPath};
use crate::workflows::pipeline::ApplicationRepository;

#[derive(Debug, Deserialize)]
pub(crate) struct WindowRequest {
    pub(crate) test_id: TestId,
    pub(crate) starts_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventRequest {
    pub(crate) event: ProctoringEvent,
}

/// Body of a single mark edit; the response id comes from the path.
#[derive(Debug, Deserialize)]
pub(crate) struct MarkRequest {
    #[serde(deserialize_with = "deserialize_raw_mark")]
    pub(crate) marks: f64,
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkMarkRequest {
    pub(crate) edits: Vec<MarkEdit>,
}

/// Router builder for test authoring, scheduling, attempts, and grading.
pub fn assessment_router<S>(
    service: Arc<AssessmentService<S>>,
    grading: Arc<GradingService<S>>,
) -> Router
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    let authoring = Router::new()
        .route(
            "/api/v1/tests",
            post(create_test_handler::<S>).get(list_tests_handler::<S>),
        )
        .route(
            "/api/v1/tests/:test_id/questions",
            post(add_question_handler::<S>).get(questions_handler::<S>),
        )
        .route("/api/v1/assignments", post(assign_handler::<S>))
        .route("/api/v1/assignments/window", post(window_handler::<S>))
        .route(
            "/api/v1/assignments/:assignment_id/attempts",
            post(start_attempt_handler::<S>),
        )
        .route(
            "/api/v1/attempts/:attempt_id/submit",
            post(submit_attempt_handler::<S>),
        )
        .route(
            "/api/v1/attempts/:attempt_id/events",
            post(proctoring_event_handler::<S>),
        )
        .with_state(service);

    let review = Router::new()
        .route(
            "/api/v1/attempts/:attempt_id/summary",
            get(summary_handler::<S>),
        )
        .route(
            "/api/v1/attempts/:attempt_id/responses",
            get(responses_handler::<S>),
        )
        .route(
            "/api/v1/attempts/:attempt_id/adjustments",
            get(adjustments_handler::<S>),
        )
        .route(
            "/api/v1/responses/:response_id/marks",
            patch(adjust_mark_handler::<S>),
        )
        .route("/api/v1/responses/marks", patch(bulk_marks_handler::<S>))
        .with_state(grading);

    authoring.merge(review)
}

pub(crate) async fn create_test_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
    ApiJson(draft): ApiJson<TestDraft>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.create_test(&ctx, draft, Utc::now()),
        StatusCode::CREATED,
        "test created",
    )
}

pub(crate) async fn list_tests_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(service.list_tests(&ctx), StatusCode::OK, "tests loaded")
}

pub(crate) async fn add_question_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
    ApiPath(test_id): ApiPath<i64>,
    ApiJson(draft): ApiJson<QuestionDraft>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.add_question(&ctx, TestId(test_id), draft),
        StatusCode::CREATED,
        "question added",
    )
}

pub(crate) async fn questions_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
    ApiPath(test_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.questions(&ctx, TestId(test_id)),
        StatusCode::OK,
        "questions loaded",
    )
}

pub(crate) async fn window_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
    ApiJson(request): ApiJson<WindowRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.check_window(&ctx, request.test_id, request.starts_at, request.ends_at),
        StatusCode::OK,
        "window checked",
    )
}

pub(crate) async fn assign_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ctx: RequestContext,
    ApiJson(request): ApiJson<AssignmentRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.assign(&ctx, request, Utc::now()),
        StatusCode::CREATED,
        "test assigned",
    )
}

pub(crate) async fn start_attempt_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ApiPath(assignment_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.start_attempt(AssignmentId(assignment_id), Utc::now()),
        StatusCode::CREATED,
        "attempt started",
    )
}

pub(crate) async fn submit_attempt_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ApiPath(attempt_id): ApiPath<i64>,
    ApiJson(request): ApiJson<SubmitRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.submit_attempt(AttemptId(attempt_id), request.answers, Utc::now()),
        StatusCode::OK,
        "attempt submitted",
    )
}

pub(crate) async fn proctoring_event_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    ApiPath(attempt_id): ApiPath<i64>,
    ApiJson(request): ApiJson<EventRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        service.record_proctoring_event(AttemptId(attempt_id), request.event),
        StatusCode::OK,
        "proctoring event recorded",
    )
}

pub(crate) async fn summary_handler<S>(
    State(grading): State<Arc<GradingService<S>>>,
    ctx: RequestContext,
    ApiPath(attempt_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        grading.summary(&ctx, AttemptId(attempt_id)),
        StatusCode::OK,
        "attempt summary",
    )
}

pub(crate) async fn responses_handler<S>(
    State(grading): State<Arc<GradingService<S>>>,
    ctx: RequestContext,
    ApiPath(attempt_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        grading.responses(&ctx, AttemptId(attempt_id)),
        StatusCode::OK,
        "responses loaded",
    )
}

pub(crate) async fn adjustments_handler<S>(
    State(grading): State<Arc<GradingService<S>>>,
    ctx: RequestContext,
    ApiPath(attempt_id): ApiPath<i64>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        grading.adjustments(&ctx, AttemptId(attempt_id)),
        StatusCode::OK,
        "mark adjustments loaded",
    )
}

pub(crate) async fn adjust_mark_handler<S>(
    State(grading): State<Arc<GradingService<S>>>,
    ctx: RequestContext,
    ApiPath(response_id): ApiPath<i64>,
    ApiJson(request): ApiJson<MarkRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    let edit = MarkEdit {
        response_id: ResponseId(response_id),
        marks: request.marks,
        reason: request.reason,
    };
    respond(
        grading.adjust_mark(&ctx, edit, Utc::now()),
        StatusCode::OK,
        "mark updated",
    )
}

pub(crate) async fn bulk_marks_handler<S>(
    State(grading): State<Arc<GradingService<S>>>,
    ctx: RequestContext,
    ApiJson(request): ApiJson<BulkMarkRequest>,
) -> Response
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    respond(
        grading.adjust_marks(&ctx, request.edits, Utc::now()).await,
        StatusCode::OK,
        "marks updated",
    )
}
