use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::identity::{RequestContext, Role};
use crate::workflows::{OperationResult, WorkflowError};

/// Claims forwarded by the identity gateway after it has verified the credential.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
pub const ROLE_HEADER: &str = "x-user-role";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn context_from_headers(headers: &HeaderMap) -> Option<RequestContext> {
    let user_id = header(headers, USER_ID_HEADER)?.parse::<i64>().ok()?;
    let organization_id = header(headers, ORGANIZATION_ID_HEADER)?
        .parse::<i64>()
        .ok()?;
    let role = header(headers, ROLE_HEADER)?.parse::<Role>().ok()?;

    Some(RequestContext::new(user_id, organization_id, role))
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context_from_headers(&parts.headers) {
            Some(context) => Ok(context),
            None => {
                tracing::warn!(path = %parts.uri.path(), "request identity missing, denying");
                let body = OperationResult::failure(&WorkflowError::Unauthorized);
                Err((StatusCode::UNAUTHORIZED, Json(body)).into_response())
            }
        }
    }
}
