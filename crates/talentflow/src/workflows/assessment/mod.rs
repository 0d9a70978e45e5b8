//! Skill tests: authoring, scheduling windows, candidate attempts, and grading.

pub mod domain;
pub mod grading;
pub mod marks;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod window;

pub use domain::{
    Answer, AssignmentId, AssignmentRequest, AssignmentStatus, AttemptId, AttemptStatus,
    Difficulty, MarkAdjustment, MarkAdjustmentRequest, MarkEdit, ProctoringEvent,
    ProctoringSettings, Question, QuestionDraft, QuestionId, QuestionKind, Response, ResponseId,
    SubmittedAnswer, Test, TestAssignment, TestAttempt, TestDraft, TestId,
};
pub use grading::{auto_grade, AutoGrade};
pub use marks::{AdjustedMark, BulkMarkReport, GradingService};
pub use repository::AssessmentRepository;
pub use router::assessment_router;
pub use scoring::{clamp_mark, summarize, AttemptSummary};
pub use service::{AssessmentService, AssignmentOutcome, AttemptReport, WindowProposal};
pub use window::{
    propose_end, required_window_minutes, validate_window, WindowCheck, DEFAULT_GRACE_MINUTES,
};

use crate::config::WorkflowConfig;

/// Tunables applied when scheduling and grading tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentPolicy {
    pub grace_minutes: u32,
    pub default_passing_marks: u8,
}

impl Default for AssessmentPolicy {
    fn default() -> Self {
        Self::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for AssessmentPolicy {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            grace_minutes: config.test_grace_minutes,
            default_passing_marks: config.default_passing_marks,
        }
    }
}
