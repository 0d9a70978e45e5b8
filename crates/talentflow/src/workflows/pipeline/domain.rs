use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transitions::ApplicationStatus;
use crate::workflows::access::UserId;
use crate::workflows::jobs::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub i64);

/// Contact and profile details captured from the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Payload sent by a candidate applying to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub job_id: JobId,
    pub candidate: CandidateProfile,
    /// Screening score from the resume matcher; clamped into 0..=100.
    #[serde(default)]
    pub resume_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate: CandidateProfile,
    pub status: ApplicationStatus,
    pub resume_score: u8,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit entry written together with every status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub note: String,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

pub(crate) fn clamp_resume_score(raw: Option<i32>) -> u8 {
    raw.unwrap_or(0).clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_scores_are_clamped() {
        assert_eq!(clamp_resume_score(None), 0);
        assert_eq!(clamp_resume_score(Some(-4)), 0);
        assert_eq!(clamp_resume_score(Some(87)), 87);
        assert_eq!(clamp_resume_score(Some(140)), 100);
    }
}
