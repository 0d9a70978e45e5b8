use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a platform user (recruiter, admin, or candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier of the tenant organization that owns jobs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub i64);

/// Role claim carried by a decoded credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "OrgAdmin", alias = "org_admin")]
    OrgAdmin,
    #[serde(rename = "HR", alias = "hr")]
    Hr,
    #[serde(rename = "Recruiter", alias = "recruiter")]
    Recruiter,
    #[serde(rename = "Interviewer", alias = "interviewer")]
    Interviewer,
    #[serde(rename = "Candidate", alias = "candidate")]
    Candidate,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::OrgAdmin => "OrgAdmin",
            Role::Hr => "HR",
            Role::Recruiter => "Recruiter",
            Role::Interviewer => "Interviewer",
            Role::Candidate => "Candidate",
        }
    }

    /// Roles allowed to open jobs and author tests.
    pub const fn manages_hiring(self) -> bool {
        matches!(self, Role::OrgAdmin | Role::Hr | Role::Recruiter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "orgadmin" => Ok(Role::OrgAdmin),
            "hr" => Ok(Role::Hr),
            "recruiter" => Ok(Role::Recruiter),
            "interviewer" => Ok(Role::Interviewer),
            "candidate" => Ok(Role::Candidate),
            _ => Err(UnknownRole(raw.to_string())),
        }
    }
}

/// Request-scoped identity handed to every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub role: Role,
}

impl RequestContext {
    pub fn new(user_id: i64, organization_id: i64, role: Role) -> Self {
        Self {
            user_id: UserId(user_id),
            organization_id: OrganizationId(organization_id),
            role,
        }
    }

    pub fn is_org_admin(&self) -> bool {
        self.role == Role::OrgAdmin
    }
}
