use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::access::{OrganizationId, ResourceScope, UserId};
use crate::workflows::pipeline::ApplicationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub i64);

/// Monitoring features applied while a candidate takes a proctored test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctoringSettings {
    pub fullscreen: bool,
    pub tab_switch_detection: bool,
    pub copy_paste_prevention: bool,
    /// Tab switches tolerated before the attempt is flagged for review.
    pub max_tab_switches: Option<u32>,
}

/// Fields supplied when authoring a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub passing_marks: Option<u8>,
    #[serde(default)]
    pub is_proctored: bool,
    #[serde(default)]
    pub proctoring: ProctoringSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub question_count: u32,
    pub total_marks: f64,
    /// Percentage of `total_marks` required to pass.
    pub passing_marks: u8,
    pub is_proctored: bool,
    pub proctoring: ProctoringSettings,
    pub created_by: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Test {
    /// Authoring access: the author and OrgAdmins of the organization.
    pub fn scope(&self) -> ResourceScope<'static> {
        ResourceScope::owned_by(self.created_by, self.organization_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    McqSingle,
    McqMultiple,
    Text,
    Coding,
}

impl QuestionKind {
    pub const fn is_choice(self) -> bool {
        matches!(self, QuestionKind::McqSingle | QuestionKind::McqMultiple)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub correct_options: Vec<usize>,
    pub marks: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub test_id: TestId,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub correct_options: Vec<usize>,
    pub marks: f64,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Expired,
    Cancelled,
}

/// Request to schedule a test for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub test_id: TestId,
    pub application_id: ApplicationId,
    pub starts_at: DateTime<Utc>,
    /// Omitted ends default to the shortest valid window.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAssignment {
    pub id: AssignmentId,
    pub test_id: TestId,
    pub application_id: ApplicationId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AssignmentStatus,
    /// Proctoring settings frozen at assignment time.
    pub proctoring: Option<ProctoringSettings>,
    pub assigned_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    /// Submitted with answers still waiting for manual review.
    Submitted,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAttempt {
    pub id: AttemptId,
    pub assignment_id: AssignmentId,
    pub test_id: TestId,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: AttemptStatus,
    pub tab_switches: u32,
    pub flagged: bool,
}

/// Candidate answer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    Options(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer: Answer,
}

/// One graded answer of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: ResponseId,
    pub attempt_id: AttemptId,
    pub question_id: QuestionId,
    pub answer: Option<Answer>,
    pub marks_awarded: f64,
    pub max_marks: f64,
    pub needs_review: bool,
    #[serde(default)]
    pub ai_feedback: Option<String>,
}

/// Monitoring signal reported by the test client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProctoringEvent {
    TabSwitch,
    FullscreenExit,
    CopyPaste,
}

/// Reviewer edit of one response's mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEdit {
    pub response_id: ResponseId,
    /// Raw reviewer input; anything that is not a finite number counts as zero.
    #[serde(deserialize_with = "deserialize_raw_mark")]
    pub marks: f64,
    pub reason: String,
}

/// Everything the store needs to apply one mark change and its audit entry together.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkAdjustmentRequest {
    pub response_id: ResponseId,
    pub raw_marks: f64,
    pub reason: String,
    pub adjusted_by: UserId,
    pub adjusted_at: DateTime<Utc>,
}

/// Audit record of a manual mark change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAdjustment {
    pub response_id: ResponseId,
    pub previous: f64,
    pub new: f64,
    pub reason: String,
    pub adjusted_by: UserId,
    pub adjusted_at: DateTime<Utc>,
}

pub(crate) fn deserialize_raw_mark<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}
