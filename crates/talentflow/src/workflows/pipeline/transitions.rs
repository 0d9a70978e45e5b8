use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stage of an application in the hiring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Shortlisted,
    TestScheduled,
    InterviewScheduled,
    WaitingForResult,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Submitted,
            Self::Shortlisted,
            Self::TestScheduled,
            Self::InterviewScheduled,
            Self::WaitingForResult,
            Self::Hired,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Shortlisted => "shortlisted",
            Self::TestScheduled => "test_scheduled",
            Self::InterviewScheduled => "interview_scheduled",
            Self::WaitingForResult => "waiting_for_result",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Shortlisted => "Shortlisted",
            Self::TestScheduled => "Test Scheduled",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::WaitingForResult => "Waiting for Result",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    /// Statuses reachable in one step from `self`.
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[
                Self::Shortlisted,
                Self::TestScheduled,
                Self::InterviewScheduled,
                Self::Rejected,
            ],
            Self::Shortlisted => &[
                Self::TestScheduled,
                Self::InterviewScheduled,
                Self::Rejected,
            ],
            Self::TestScheduled => &[Self::InterviewScheduled, Self::Rejected],
            Self::InterviewScheduled => &[Self::WaitingForResult, Self::Rejected],
            Self::WaitingForResult => &[Self::Hired, Self::Rejected],
            Self::Hired | Self::Rejected => &[],
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn transition_to(self, target: Self) -> Result<StatusTransition, TransitionError> {
        if self.can_transition_to(target) {
            Ok(StatusTransition::between(self, target))
        } else if self.is_terminal() {
            Err(TransitionError::Terminal { from: self })
        } else {
            Err(TransitionError::NotAllowed {
                from: self,
                to: target,
            })
        }
    }

    /// Actions offered to a reviewer looking at an application in this status.
    pub fn available_actions(self) -> Vec<StatusTransition> {
        self.allowed_transitions()
            .iter()
            .map(|target| StatusTransition::between(self, *target))
            .collect()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TransitionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == wanted)
            .ok_or_else(|| TransitionError::UnknownStatus(raw.to_string()))
    }
}

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTone {
    Positive,
    Neutral,
    Negative,
}

/// An allowed move plus the metadata reviewers see for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub action_label: &'static str,
    pub tone: ActionTone,
    #[serde(skip)]
    note_template: &'static str,
}

impl StatusTransition {
    fn between(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        let (action_label, tone, note_template) = match to {
            ApplicationStatus::Shortlisted => (
                "Shortlist",
                ActionTone::Positive,
                "{candidate} has been shortlisted for {job}.",
            ),
            ApplicationStatus::TestScheduled => (
                "Schedule Test",
                ActionTone::Neutral,
                "An assessment has been scheduled for {candidate} for the {job} role.",
            ),
            ApplicationStatus::InterviewScheduled => (
                "Schedule Interview",
                ActionTone::Neutral,
                "An interview has been scheduled with {candidate} for the {job} role.",
            ),
            ApplicationStatus::WaitingForResult => (
                "Await Result",
                ActionTone::Neutral,
                "{candidate} completed interviews for {job}; awaiting the final decision.",
            ),
            ApplicationStatus::Hired => (
                "Hire",
                ActionTone::Positive,
                "{candidate} has been hired for {job}.",
            ),
            ApplicationStatus::Rejected => (
                "Reject",
                ActionTone::Negative,
                "{candidate} will not be moving forward for {job}.",
            ),
            ApplicationStatus::Submitted => (
                "Reopen",
                ActionTone::Neutral,
                "{candidate}'s application for {job} was returned to submitted.",
            ),
        };

        Self {
            from,
            to,
            action_label,
            tone,
            note_template,
        }
    }

    /// Audit note recorded when the reviewer does not write one.
    pub fn default_note(&self, candidate_name: &str, job_title: &str) -> String {
        self.note_template
            .replace("{candidate}", candidate_name)
            .replace("{job}", job_title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move an application from {from} to {to}")]
    NotAllowed {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application is already {from}; no further status changes are possible")]
    Terminal { from: ApplicationStatus },
    #[error("unknown application status '{0}'")]
    UnknownStatus(String),
}
