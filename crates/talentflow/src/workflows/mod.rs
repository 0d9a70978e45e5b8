pub mod access;
pub mod assessment;
pub mod intake;
pub mod jobs;
mod outcome;
pub mod pipeline;
mod request;

pub use outcome::{BatchItemFailure, OperationResult, WorkflowError};

use std::sync::Arc;

use axum::Router;

use crate::config::WorkflowConfig;
use assessment::{AssessmentPolicy, AssessmentRepository, AssessmentService, GradingService};
use jobs::{JobRepository, JobService, RecruiterDirectory};
use pipeline::{ApplicationRepository, PipelineService};

/// Compose every workflow router over a single backing store.
pub fn api_router<S>(store: Arc<S>, config: &WorkflowConfig) -> Router
where
    S: JobRepository + RecruiterDirectory + ApplicationRepository + AssessmentRepository + 'static,
{
    let policy = AssessmentPolicy::from(config);

    Router::new()
        .merge(jobs::job_router(Arc::new(JobService::new(store.clone()))))
        .merge(pipeline::pipeline_router(Arc::new(PipelineService::new(
            store.clone(),
        ))))
        .merge(assessment::assessment_router(
            Arc::new(AssessmentService::new(store.clone(), policy)),
            Arc::new(GradingService::new(store, config.bulk_mark_concurrency)),
        ))
}
