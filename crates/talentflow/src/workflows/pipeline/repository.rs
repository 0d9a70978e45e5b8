use crate::store::RepositoryError;
use crate::workflows::jobs::JobId;

use super::domain::{Application, ApplicationId, StatusChange};

/// Storage abstraction for applications and their status history.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError>;
    /// Set the status and append the audit entry as one write.
    fn apply_status_change(
        &self,
        id: ApplicationId,
        change: StatusChange,
    ) -> Result<Application, RepositoryError>;
    fn status_history(&self, id: ApplicationId) -> Result<Vec<StatusChange>, RepositoryError>;
}
