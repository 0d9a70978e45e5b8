use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::store::RepositoryError;

/// Failure taxonomy shared by every workflow operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("you are not authorized to perform this action")]
    Unauthorized,
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    ValidationFailed(String),
    #[error(
        "some items failed: {} of {} updates were not saved",
        .failed.len(),
        .failed.len() + .succeeded
    )]
    PartialBatchFailure {
        succeeded: usize,
        failed: Vec<BatchItemFailure>,
    },
    #[error("upstream service unavailable: {0}")]
    UpstreamServiceFailure(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Unauthorized => StatusCode::FORBIDDEN,
            WorkflowError::NotFound { .. } | WorkflowError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            WorkflowError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::PartialBatchFailure { .. } => StatusCode::MULTI_STATUS,
            WorkflowError::UpstreamServiceFailure(_) => StatusCode::BAD_GATEWAY,
            WorkflowError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            WorkflowError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A single rejected item of a batch write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    pub reason: String,
}

/// Uniform response envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> OperationResult<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl OperationResult<serde_json::Value> {
    pub fn failure(error: &WorkflowError) -> Self {
        let data = match error {
            WorkflowError::PartialBatchFailure { succeeded, failed } => Some(serde_json::json!({
                "succeeded": succeeded,
                "failed": failed,
            })),
            _ => None,
        };

        Self {
            success: false,
            message: error.to_string(),
            data,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(OperationResult::failure(&self))).into_response()
    }
}

/// Render a service result with the envelope, using `status` on success.
pub(crate) fn respond<T: Serialize>(
    result: Result<T, WorkflowError>,
    status: StatusCode,
    message: &str,
) -> Response {
    match result {
        Ok(data) => (status, Json(OperationResult::ok(message, data))).into_response(),
        Err(error) => {
            if error.status_code().is_server_error() {
                tracing::error!(%error, "workflow operation failed");
            }
            error.into_response()
        }
    }
}
