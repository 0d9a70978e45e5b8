use crate::store::RepositoryError;
use crate::workflows::access::{OrganizationId, Recruiter};

use super::domain::{Job, JobId};

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn jobs_for_organization(&self, organization: OrganizationId)
        -> Result<Vec<Job>, RepositoryError>;
}

/// Lookup of users that may be granted access to jobs.
pub trait RecruiterDirectory: Send + Sync {
    fn recruiters(&self, organization: OrganizationId) -> Result<Vec<Recruiter>, RepositoryError>;
}
