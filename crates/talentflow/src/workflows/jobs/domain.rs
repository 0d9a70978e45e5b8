use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::access::{OrganizationId, ResourceScope, UserId};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub i64);

/// Publication state of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Draft,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "Active",
            JobStatus::Draft => "Draft",
            JobStatus::Closed => "Closed",
        }
    }

    pub const fn accepts_applications(self) -> bool {
        matches!(self, JobStatus::Active)
    }
}

/// Advertised pay band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    pub min: u32,
    pub max: u32,
    pub currency: String,
}

/// Fields supplied when opening a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub compensation: Option<Compensation>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub organization_id: OrganizationId,
    pub created_by: UserId,
    pub status: JobStatus,
    pub assigned_recruiters: BTreeSet<UserId>,
    pub title: String,
    pub department: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub compensation: Option<Compensation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Authorization scope covering the job and everything hanging off it.
    pub fn scope(&self) -> ResourceScope<'_> {
        ResourceScope::new(
            self.created_by,
            self.organization_id,
            &self.assigned_recruiters,
        )
    }
}
