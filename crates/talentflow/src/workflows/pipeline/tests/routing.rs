use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::access::{RequestContext, Role};
use crate::workflows::pipeline::router::submit_handler;
use crate::workflows::pipeline::{pipeline_router, PipelineService};
use crate::workflows::request::ApiJson;

#[tokio::test]
async fn submit_route_creates_application() {
    let h = harness();
    let router = pipeline_router(h.service.clone());

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/applications",
            None,
            Some(json!({
                "job_id": h.job.id.0,
                "candidate": { "name": "Ada Lovelace", "email": "ada@example.com" },
                "resume_score": -12,
            })),
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "submitted");
    assert_eq!(body["data"]["resume_score"], 0);
}

#[tokio::test]
async fn submit_handler_reports_store_outage_as_internal_error() {
    let service = Arc::new(PipelineService::new(Arc::new(UnavailableStore)));
    let response = submit_handler::<UnavailableStore>(
        State(service),
        ApiJson(submission(
            crate::workflows::jobs::JobId(1),
            "Ada",
            "ada@example.com",
            50,
        )),
    )
    .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_identity_is_rejected_before_the_handler_runs() {
    let h = harness();
    let application = h.apply("Ada Lovelace", "ada@example.com", 70);

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            &format!("/api/v1/applications/{}", application.id.0),
            None,
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_transition_is_unprocessable() {
    let h = harness();
    let application = h.apply("Ada Lovelace", "ada@example.com", 70);
    h.service
        .change_status(
            &owner(),
            application.id,
            crate::workflows::pipeline::ApplicationStatus::Shortlisted,
            None,
            now(),
        )
        .expect("shortlisted");

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "POST",
            &format!("/api/v1/applications/{}/status", application.id.0),
            Some(&owner()),
            Some(json!({ "status": "hired" })),
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["message"],
        "cannot move an application from shortlisted to hired"
    );
}

#[tokio::test]
async fn unassigned_user_gets_forbidden() {
    let h = harness();
    let application = h.apply("Ada Lovelace", "ada@example.com", 70);
    let outsider = RequestContext::new(7, 10, Role::Hr);

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            &format!("/api/v1/applications/{}/history", application.id.0),
            Some(&outsider),
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_route_reads_filters_from_query() {
    let h = harness();
    h.apply("Ada Lovelace", "ada@contoso.com", 70);
    h.apply("Alan Turing", "alan@example.com", 90);
    h.apply("Grace Hopper", "grace@contoso.com", 85);

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            &format!(
                "/api/v1/jobs/{}/applications?status=submitted&search=CONTOSO&sort=resume_score&order=asc",
                h.job.id.0
            ),
            Some(&owner()),
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::OK);
    let body = read_json_body(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["candidate"]["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
}

#[tokio::test]
async fn unknown_status_filter_is_a_bad_request() {
    let h = harness();
    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            &format!("/api/v1/jobs/{}/applications?status=archived", h.job.id.0),
            Some(&owner()),
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("unknown application status 'archived'"));
}

#[tokio::test]
async fn non_numeric_application_id_gets_the_envelope() {
    let h = harness();
    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            "/api/v1/applications/latest",
            Some(&owner()),
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_status_body_gets_the_envelope() {
    let h = harness();
    let application = h.apply("Ada Lovelace", "ada@example.com", 70);

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "POST",
            &format!("/api/v1/applications/{}/status", application.id.0),
            Some(&owner()),
            Some(json!({ "status": "promoted" })),
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn actions_route_lists_allowed_moves() {
    let h = harness();
    let application = h.apply("Ada Lovelace", "ada@example.com", 70);

    let response = pipeline_router(h.service.clone())
        .oneshot(request(
            "GET",
            &format!("/api/v1/applications/{}/actions", application.id.0),
            Some(&owner()),
            None,
        ))
        .await
        .expect("response");

    assert_status(&response, StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["data"][0]["to"], "shortlisted");
    assert_eq!(body["data"][0]["tone"], "positive");
}
