use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::domain::{
    AttemptId, AttemptStatus, MarkAdjustment, MarkAdjustmentRequest, MarkEdit, Response,
};
use super::repository::AssessmentRepository;
use super::scoring::summarize;
use super::service::{load_attempt_authorized, AttemptReport};
use crate::store::RepositoryError;
use crate::workflows::access::RequestContext;
use crate::workflows::jobs::JobRepository;
use crate::workflows::pipeline::ApplicationRepository;
use crate::workflows::{BatchItemFailure, WorkflowError};

/// A response after a manual mark change, with the audit entry written alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustedMark {
    pub response: Response,
    pub adjustment: MarkAdjustment,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkMarkReport {
    pub updated: Vec<AdjustedMark>,
}

/// Reviewer-facing grading: manual mark changes and attempt summaries.
pub struct GradingService<S> {
    store: Arc<S>,
    concurrency: usize,
}

impl<S> Clone for GradingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            concurrency: self.concurrency,
        }
    }
}

impl<S> GradingService<S>
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    pub fn new(store: Arc<S>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Overwrite one response's mark.
    ///
    /// The raw value is clamped to `[0, max]`, and the previous value, new value,
    /// and reason are written to the audit trail in the same store write.
    pub fn adjust_mark(
        &self,
        ctx: &RequestContext,
        edit: MarkEdit,
        now: DateTime<Utc>,
    ) -> Result<AdjustedMark, WorkflowError> {
        let reason = edit.reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::validation(
                "a reason is required when changing marks",
            ));
        }

        let response = self
            .store
            .fetch_response(edit.response_id)?
            .ok_or_else(|| WorkflowError::not_found("response", edit.response_id.0))?;
        let (attempt, ..) = load_attempt_authorized(self.store.as_ref(), ctx, response.attempt_id)?;
        if attempt.status == AttemptStatus::InProgress {
            return Err(WorkflowError::validation(
                "marks cannot change while the attempt is running",
            ));
        }

        let (response, adjustment) = self.store.adjust_response_mark(MarkAdjustmentRequest {
            response_id: edit.response_id,
            raw_marks: edit.marks,
            reason: reason.to_string(),
            adjusted_by: ctx.user_id,
            adjusted_at: now,
        })?;

        if attempt.status == AttemptStatus::Submitted {
            let pending = self
                .store
                .responses_for_attempt(attempt.id)?
                .iter()
                .any(|response| response.needs_review);
            if !pending {
                let mut graded = attempt;
                graded.status = AttemptStatus::Graded;
                // A concurrent edit may have promoted the attempt already.
                match self.store.update_attempt(graded, AttemptStatus::Submitted) {
                    Ok(()) | Err(RepositoryError::Conflict) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }

        info!(
            response_id = response.id.0,
            attempt_id = response.attempt_id.0,
            previous = adjustment.previous,
            new = adjustment.new,
            adjusted_by = ctx.user_id.0,
            "response mark adjusted"
        );
        Ok(AdjustedMark {
            response,
            adjustment,
        })
    }

    /// Apply many mark edits as independent writes.
    ///
    /// Edits run concurrently, at most `concurrency` at a time. Failed items are
    /// reported together; the ones that succeeded stay written.
    pub async fn adjust_marks(
        &self,
        ctx: &RequestContext,
        edits: Vec<MarkEdit>,
        now: DateTime<Utc>,
    ) -> Result<BulkMarkReport, WorkflowError> {
        if edits.is_empty() {
            return Err(WorkflowError::validation("no mark changes supplied"));
        }

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for edit in edits {
            let service = self.clone();
            let ctx = ctx.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let response_id = edit.response_id;
                let outcome =
                    tokio::task::spawn_blocking(move || service.adjust_mark(&ctx, edit, now))
                        .await;
                (response_id, outcome)
            });
        }

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Ok(adjusted)))) => updated.push(adjusted),
                Ok((response_id, Ok(Err(err)))) => failed.push(BatchItemFailure {
                    item_id: Some(response_id.0),
                    reason: err.to_string(),
                }),
                Ok((response_id, Err(join_err))) => failed.push(BatchItemFailure {
                    item_id: Some(response_id.0),
                    reason: format!("mark update did not complete: {join_err}"),
                }),
                Err(join_err) => failed.push(BatchItemFailure {
                    item_id: None,
                    reason: format!("mark update did not complete: {join_err}"),
                }),
            }
        }

        updated.sort_by_key(|adjusted: &AdjustedMark| adjusted.response.id);
        if failed.is_empty() {
            return Ok(BulkMarkReport { updated });
        }

        failed.sort_by_key(|failure| failure.item_id);
        warn!(
            succeeded = updated.len(),
            failed = failed.len(),
            "bulk mark update partially failed"
        );
        Err(WorkflowError::PartialBatchFailure {
            succeeded: updated.len(),
            failed,
        })
    }

    /// Score an attempt against its test's passing percentage.
    pub fn summary(
        &self,
        ctx: &RequestContext,
        attempt_id: AttemptId,
    ) -> Result<AttemptReport, WorkflowError> {
        let (attempt, test, ..) = load_attempt_authorized(self.store.as_ref(), ctx, attempt_id)?;
        let responses = self.store.responses_for_attempt(attempt_id)?;
        Ok(AttemptReport {
            summary: summarize(&responses, test.passing_marks),
            attempt,
        })
    }

    pub fn responses(
        &self,
        ctx: &RequestContext,
        attempt_id: AttemptId,
    ) -> Result<Vec<Response>, WorkflowError> {
        load_attempt_authorized(self.store.as_ref(), ctx, attempt_id)?;
        Ok(self.store.responses_for_attempt(attempt_id)?)
    }

    /// Audit trail of manual changes for an attempt, oldest first.
    pub fn adjustments(
        &self,
        ctx: &RequestContext,
        attempt_id: AttemptId,
    ) -> Result<Vec<MarkAdjustment>, WorkflowError> {
        load_attempt_authorized(self.store.as_ref(), ctx, attempt_id)?;
        Ok(self.store.mark_adjustments(attempt_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::workflows::access::Role;
    use crate::workflows::assessment::domain::{
        Answer, AssignmentRequest, Difficulty, QuestionDraft, QuestionKind, ResponseId,
        SubmittedAnswer, TestDraft,
    };
    use crate::workflows::assessment::{AssessmentPolicy, AssessmentService};
    use crate::workflows::jobs::{JobDraft, JobService, JobStatus};
    use crate::workflows::pipeline::{ApplicationSubmission, CandidateProfile, PipelineService};
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 4, hour, minute, 0).unwrap()
    }

    fn open_question(prompt: &str, marks: f64) -> QuestionDraft {
        QuestionDraft {
            kind: QuestionKind::Coding,
            prompt: prompt.to_string(),
            options: Vec::new(),
            correct_answer: None,
            correct_options: Vec::new(),
            marks,
            difficulty: Difficulty::Hard,
        }
    }

    /// Build a submitted attempt with three coding answers awaiting review.
    fn graded_attempt() -> (GradingService<InMemoryStore>, RequestContext, AttemptId, Vec<ResponseId>) {
        let store = Arc::new(InMemoryStore::default());
        let owner = RequestContext::new(5, 10, Role::Hr);

        let job = JobService::new(store.clone())
            .create(
                &owner,
                JobDraft {
                    title: "Compiler Engineer".to_string(),
                    department: None,
                    description: String::new(),
                    location: None,
                    compensation: None,
                    status: Some(JobStatus::Active),
                },
                at(8, 0),
            )
            .expect("job");
        let application = PipelineService::new(store.clone())
            .submit(
                ApplicationSubmission {
                    job_id: job.id,
                    candidate: CandidateProfile {
                        name: "Alan Turing".to_string(),
                        email: "alan@example.com".to_string(),
                        phone: None,
                        department: None,
                        skills: Vec::new(),
                    },
                    resume_score: Some(90),
                },
                at(8, 0),
            )
            .expect("application");

        let assessments = AssessmentService::new(store.clone(), AssessmentPolicy::default());
        let test = assessments
            .create_test(
                &owner,
                TestDraft {
                    title: "Parsing".to_string(),
                    description: String::new(),
                    duration_minutes: 60,
                    passing_marks: Some(75),
                    is_proctored: false,
                    proctoring: Default::default(),
                },
                at(8, 0),
            )
            .expect("test");
        for (prompt, marks) in [("Lexer", 30.0), ("Parser", 30.0), ("Type checker", 30.0)] {
            assessments
                .add_question(&owner, test.id, open_question(prompt, marks))
                .expect("question");
        }
        let questions = assessments.questions(&owner, test.id).expect("questions");

        let assignment = assessments
            .assign(
                &owner,
                AssignmentRequest {
                    test_id: test.id,
                    application_id: application.id,
                    starts_at: at(9, 0),
                    ends_at: None,
                },
                at(8, 30),
            )
            .expect("assigned")
            .assignment;
        let attempt = assessments
            .start_attempt(assignment.id, at(9, 0))
            .expect("started");
        let answers = questions
            .iter()
            .map(|q| SubmittedAnswer {
                question_id: q.id,
                answer: Answer::Text(format!("solution for {}", q.prompt)),
            })
            .collect();
        let report = assessments
            .submit_attempt(attempt.id, answers, at(9, 45))
            .expect("submitted");
        assert_eq!(report.attempt.status, AttemptStatus::Submitted);

        let grading = GradingService::new(store.clone(), 2);
        let response_ids = grading
            .responses(&owner, attempt.id)
            .expect("responses")
            .iter()
            .map(|response| response.id)
            .collect();
        (grading, owner, attempt.id, response_ids)
    }

    fn edit(id: ResponseId, marks: f64) -> MarkEdit {
        MarkEdit {
            response_id: id,
            marks,
            reason: "reviewed against rubric".to_string(),
        }
    }

    #[test]
    fn adjusting_clamps_and_records_audit() {
        let (grading, owner, attempt_id, ids) = graded_attempt();
        let adjusted = grading
            .adjust_mark(&owner, edit(ids[0], 45.0), at(12, 0))
            .expect("adjusted");

        assert_eq!(adjusted.response.marks_awarded, 30.0);
        assert_eq!(adjusted.adjustment.previous, 0.0);
        assert_eq!(adjusted.adjustment.new, 30.0);
        assert_eq!(adjusted.adjustment.reason, "reviewed against rubric");
        assert_eq!(grading.adjustments(&owner, attempt_id).unwrap().len(), 1);
    }

    #[test]
    fn blank_reasons_are_rejected() {
        let (grading, owner, _, ids) = graded_attempt();
        let mut blank = edit(ids[0], 10.0);
        blank.reason = "   ".to_string();
        assert!(matches!(
            grading.adjust_mark(&owner, blank, at(12, 0)),
            Err(WorkflowError::ValidationFailed(_))
        ));
    }

    #[test]
    fn outsiders_cannot_adjust() {
        let (grading, _, _, ids) = graded_attempt();
        let outsider = RequestContext::new(77, 10, Role::Recruiter);
        assert!(matches!(
            grading.adjust_mark(&outsider, edit(ids[0], 10.0), at(12, 0)),
            Err(WorkflowError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn bulk_adjustment_scores_and_grades_the_attempt() {
        let (grading, owner, attempt_id, ids) = graded_attempt();
        let report = grading
            .adjust_marks(
                &owner,
                vec![edit(ids[0], 30.0), edit(ids[1], 30.0), edit(ids[2], 12.0)],
                at(12, 0),
            )
            .await
            .expect("all saved");
        assert_eq!(report.updated.len(), 3);

        let summary = grading.summary(&owner, attempt_id).expect("summary");
        assert_eq!(summary.summary.total_score, 72.0);
        assert_eq!(summary.summary.percentage, 80);
        assert!(summary.summary.passed);
        assert_eq!(summary.attempt.status, AttemptStatus::Graded);
    }

    #[tokio::test]
    async fn bulk_adjustment_reports_partial_failure_without_rollback() {
        let (grading, owner, attempt_id, ids) = graded_attempt();
        let err = grading
            .adjust_marks(
                &owner,
                vec![edit(ids[0], 20.0), edit(ResponseId(-1), 5.0)],
                at(12, 0),
            )
            .await
            .expect_err("one edit fails");

        match err {
            WorkflowError::PartialBatchFailure { succeeded, failed } => {
                assert_eq!(succeeded, 1);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].item_id, Some(-1));
            }
            other => panic!("unexpected error: {other}"),
        }

        let responses = grading.responses(&owner, attempt_id).expect("responses");
        let kept = responses.iter().find(|r| r.id == ids[0]).expect("response");
        assert_eq!(kept.marks_awarded, 20.0);
    }
}
