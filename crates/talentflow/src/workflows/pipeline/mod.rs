//! Candidate applications and the status pipeline they move through.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationSubmission, CandidateProfile, StatusChange,
};
pub use filter::{
    apply_filters, ApplicationFilter, PipelineEntry, SortKey, SortOrder, StatusFilter,
};
pub use repository::ApplicationRepository;
pub use router::pipeline_router;
pub use service::{PipelineService, StatusUpdate};
pub use transitions::{ActionTone, ApplicationStatus, StatusTransition, TransitionError};
