//! Job postings and their recruiter access lists.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Compensation, Job, JobDraft, JobId, JobStatus};
pub use repository::{JobRepository, RecruiterDirectory};
pub use router::job_router;
pub use service::{JobService, RecruiterAccessView};
