use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    AssignmentId, AssignmentRequest, AssignmentStatus, AttemptId, AttemptStatus, ProctoringEvent,
    Question, QuestionDraft, QuestionId, QuestionKind, Response, ResponseId, SubmittedAnswer, Test,
    TestAssignment, TestAttempt, TestDraft, TestId,
};
use super::grading::auto_grade;
use super::repository::AssessmentRepository;
use super::scoring::{summarize, AttemptSummary};
use super::window::{propose_end, validate_window, WindowCheck};
use super::AssessmentPolicy;
use crate::store::RepositoryError;
use crate::workflows::access::{authorize, RequestContext};
use crate::workflows::jobs::{Job, JobRepository};
use crate::workflows::pipeline::service::{load_authorized, record_transition};
use crate::workflows::pipeline::{
    Application, ApplicationRepository, ApplicationStatus, StatusUpdate,
};
use crate::workflows::WorkflowError;

static TEST_SEQUENCE: AtomicI64 = AtomicI64::new(1);
static QUESTION_SEQUENCE: AtomicI64 = AtomicI64::new(1);
static ASSIGNMENT_SEQUENCE: AtomicI64 = AtomicI64::new(1);
static ATTEMPT_SEQUENCE: AtomicI64 = AtomicI64::new(1);
static RESPONSE_SEQUENCE: AtomicI64 = AtomicI64::new(1);

fn next_id(sequence: &AtomicI64) -> i64 {
    sequence.fetch_add(1, Ordering::Relaxed)
}

/// A window check together with the end time it was checked against.
#[derive(Debug, Clone, Serialize)]
pub struct WindowProposal {
    pub test_id: TestId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(flatten)]
    pub check: WindowCheck,
}

/// New assignment plus the pipeline move it triggered, if any.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentOutcome {
    pub assignment: TestAssignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_update: Option<StatusUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub attempt: TestAttempt,
    pub summary: AttemptSummary,
}

/// Resolve an attempt to the application and job that govern access to it.
pub(crate) fn load_attempt_authorized<S>(
    store: &S,
    ctx: &RequestContext,
    attempt_id: AttemptId,
) -> Result<(TestAttempt, Test, Application, Job), WorkflowError>
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + ?Sized,
{
    let attempt = store
        .fetch_attempt(attempt_id)?
        .ok_or_else(|| WorkflowError::not_found("attempt", attempt_id.0))?;
    let assignment = store
        .fetch_assignment(attempt.assignment_id)?
        .ok_or_else(|| WorkflowError::not_found("assignment", attempt.assignment_id.0))?;
    let (application, job) = load_authorized(store, ctx, assignment.application_id)?;
    let test = store
        .fetch_test(attempt.test_id)?
        .ok_or_else(|| WorkflowError::not_found("test", attempt.test_id.0))?;
    Ok((attempt, test, application, job))
}

/// Service for authoring tests, scheduling them, and running candidate attempts.
pub struct AssessmentService<S> {
    store: Arc<S>,
    policy: AssessmentPolicy,
}

impl<S> AssessmentService<S>
where
    S: JobRepository + ApplicationRepository + AssessmentRepository + 'static,
{
    pub fn new(store: Arc<S>, policy: AssessmentPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> AssessmentPolicy {
        self.policy
    }

    pub fn create_test(
        &self,
        ctx: &RequestContext,
        draft: TestDraft,
        now: DateTime<Utc>,
    ) -> Result<Test, WorkflowError> {
        if !ctx.role.manages_hiring() {
            return Err(WorkflowError::Unauthorized);
        }

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(WorkflowError::validation("test title is required"));
        }
        if draft.duration_minutes == 0 {
            return Err(WorkflowError::validation(
                "test duration must be at least one minute",
            ));
        }
        let passing_marks = draft
            .passing_marks
            .unwrap_or(self.policy.default_passing_marks);
        if passing_marks > 100 {
            return Err(WorkflowError::validation(format!(
                "passing marks must be a percentage between 0 and 100, got {passing_marks}"
            )));
        }

        let test = Test {
            id: TestId(next_id(&TEST_SEQUENCE)),
            organization_id: ctx.organization_id,
            title: title.to_string(),
            description: draft.description,
            duration_minutes: draft.duration_minutes,
            question_count: 0,
            total_marks: 0.0,
            passing_marks,
            is_proctored: draft.is_proctored,
            proctoring: draft.proctoring,
            created_by: ctx.user_id,
            is_active: true,
            created_at: now,
        };

        let stored = self.store.insert_test(test)?;
        info!(
            test_id = stored.id.0,
            organization_id = stored.organization_id.0,
            duration_minutes = stored.duration_minutes,
            "test created"
        );
        Ok(stored)
    }

    /// Tests of the requester's organization. Visible to any hiring role.
    pub fn list_tests(&self, ctx: &RequestContext) -> Result<Vec<Test>, WorkflowError> {
        if !ctx.role.manages_hiring() {
            return Err(WorkflowError::Unauthorized);
        }
        Ok(self.store.tests_for_organization(ctx.organization_id)?)
    }

    pub fn add_question(
        &self,
        ctx: &RequestContext,
        test_id: TestId,
        draft: QuestionDraft,
    ) -> Result<Test, WorkflowError> {
        let test = self.load_test(test_id)?;
        authorize(ctx, &test.scope())?;
        validate_question(&draft)?;

        let question = Question {
            id: QuestionId(next_id(&QUESTION_SEQUENCE)),
            test_id,
            kind: draft.kind,
            prompt: draft.prompt.trim().to_string(),
            options: draft.options,
            correct_answer: draft
                .correct_answer
                .map(|answer| answer.trim().to_string())
                .filter(|answer| !answer.is_empty()),
            correct_options: draft.correct_options,
            marks: draft.marks,
            difficulty: draft.difficulty,
        };

        let updated = self.store.insert_question(question)?;
        info!(
            test_id = updated.id.0,
            question_count = updated.question_count,
            total_marks = updated.total_marks,
            "question added"
        );
        Ok(updated)
    }

    pub fn questions(
        &self,
        ctx: &RequestContext,
        test_id: TestId,
    ) -> Result<Vec<Question>, WorkflowError> {
        let test = self.load_test(test_id)?;
        authorize(ctx, &test.scope())?;
        Ok(self.store.questions_for_test(test_id)?)
    }

    /// Validate a scheduling window, proposing the end time when it is missing.
    pub fn check_window(
        &self,
        ctx: &RequestContext,
        test_id: TestId,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<WindowProposal, WorkflowError> {
        let test = self.load_test(test_id)?;
        if test.organization_id != ctx.organization_id {
            return Err(WorkflowError::Unauthorized);
        }
        Ok(self.window_for(&test, starts_at, ends_at))
    }

    /// Schedule a test for an application.
    ///
    /// The window is checked before anything is written. When the application may
    /// still move to `test_scheduled`, that transition is recorded as well.
    pub fn assign(
        &self,
        ctx: &RequestContext,
        request: AssignmentRequest,
        now: DateTime<Utc>,
    ) -> Result<AssignmentOutcome, WorkflowError> {
        let (application, job) = load_authorized(self.store.as_ref(), ctx, request.application_id)?;
        let test = self.load_test(request.test_id)?;
        if test.organization_id != job.organization_id {
            return Err(WorkflowError::Unauthorized);
        }
        if !test.is_active {
            return Err(WorkflowError::validation(format!(
                "test {} is inactive and cannot be assigned",
                test.id.0
            )));
        }
        if test.question_count == 0 {
            return Err(WorkflowError::validation(format!(
                "test {} has no questions yet",
                test.id.0
            )));
        }
        if application.status.is_terminal() {
            return Err(WorkflowError::validation(format!(
                "application {} is already {}",
                application.id.0, application.status
            )));
        }

        let proposal = self.window_for(&test, request.starts_at, request.ends_at);
        if !proposal.check.valid {
            return Err(WorkflowError::validation(format!(
                "test window of {} minutes is shorter than the required {} minutes",
                proposal.check.actual_minutes, proposal.check.required_minutes
            )));
        }

        let assignment = TestAssignment {
            id: AssignmentId(next_id(&ASSIGNMENT_SEQUENCE)),
            test_id: test.id,
            application_id: application.id,
            starts_at: proposal.starts_at,
            ends_at: proposal.ends_at,
            status: AssignmentStatus::Scheduled,
            proctoring: test.is_proctored.then(|| test.proctoring.clone()),
            assigned_by: ctx.user_id,
            created_at: now,
        };
        let assignment = self.store.insert_assignment(assignment)?;

        let status_update = if application
            .status
            .can_transition_to(ApplicationStatus::TestScheduled)
        {
            Some(record_transition(
                self.store.as_ref(),
                ctx,
                &application,
                &job,
                ApplicationStatus::TestScheduled,
                None,
                now,
            )?)
        } else {
            None
        };

        info!(
            assignment_id = assignment.id.0,
            test_id = test.id.0,
            application_id = application.id.0,
            starts_at = %assignment.starts_at,
            ends_at = %assignment.ends_at,
            "test assigned"
        );
        Ok(AssignmentOutcome {
            assignment,
            status_update,
        })
    }

    /// Open the candidate's attempt. Only possible inside the scheduled window.
    pub fn start_attempt(
        &self,
        assignment_id: AssignmentId,
        now: DateTime<Utc>,
    ) -> Result<TestAttempt, WorkflowError> {
        let assignment = self
            .store
            .fetch_assignment(assignment_id)?
            .ok_or_else(|| WorkflowError::not_found("assignment", assignment_id.0))?;
        if assignment.status != AssignmentStatus::Scheduled {
            return Err(WorkflowError::validation(format!(
                "assignment {} cannot be started from its current state",
                assignment_id.0
            )));
        }
        if now < assignment.starts_at {
            return Err(WorkflowError::validation(format!(
                "the test opens at {}",
                assignment.starts_at
            )));
        }
        if now > assignment.ends_at {
            self.store
                .set_assignment_status(assignment_id, AssignmentStatus::Expired)?;
            return Err(WorkflowError::validation("the test window has closed"));
        }

        let test = self.load_test(assignment.test_id)?;
        let deadline =
            (now + Duration::minutes(i64::from(test.duration_minutes))).min(assignment.ends_at);
        let attempt = TestAttempt {
            id: AttemptId(next_id(&ATTEMPT_SEQUENCE)),
            assignment_id,
            test_id: test.id,
            started_at: now,
            deadline,
            submitted_at: None,
            status: AttemptStatus::InProgress,
            tab_switches: 0,
            flagged: false,
        };

        let attempt = self.store.insert_attempt(attempt).map_err(|err| match err {
            RepositoryError::Conflict => {
                WorkflowError::validation("this test has already been started")
            }
            other => other.into(),
        })?;
        self.store
            .set_assignment_status(assignment_id, AssignmentStatus::InProgress)?;

        info!(
            attempt_id = attempt.id.0,
            assignment_id = assignment_id.0,
            deadline = %attempt.deadline,
            "test attempt started"
        );
        Ok(attempt)
    }

    /// Grade and close an attempt. Late submissions past the grace period are refused.
    pub fn submit_attempt(
        &self,
        attempt_id: AttemptId,
        answers: Vec<SubmittedAnswer>,
        now: DateTime<Utc>,
    ) -> Result<AttemptReport, WorkflowError> {
        let mut attempt = self.load_attempt(attempt_id)?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(WorkflowError::validation(
                "this attempt has already been submitted",
            ));
        }
        let cutoff = attempt.deadline + Duration::minutes(i64::from(self.policy.grace_minutes));
        if now > cutoff {
            return Err(WorkflowError::validation(format!(
                "submission deadline passed at {cutoff}"
            )));
        }

        let test = self.load_test(attempt.test_id)?;
        let questions = self.store.questions_for_test(test.id)?;
        let mut by_question: HashMap<QuestionId, _> = HashMap::new();
        for submitted in answers {
            if !questions.iter().any(|q| q.id == submitted.question_id) {
                return Err(WorkflowError::validation(format!(
                    "question {} is not part of test {}",
                    submitted.question_id.0, test.id.0
                )));
            }
            by_question.insert(submitted.question_id, submitted.answer);
        }

        let responses: Vec<Response> = questions
            .iter()
            .map(|question| {
                let answer = by_question.remove(&question.id);
                let grade = auto_grade(question, answer.as_ref());
                Response {
                    id: ResponseId(next_id(&RESPONSE_SEQUENCE)),
                    attempt_id,
                    question_id: question.id,
                    answer,
                    marks_awarded: grade.marks_awarded,
                    max_marks: question.marks,
                    needs_review: grade.needs_review,
                    ai_feedback: None,
                }
            })
            .collect();

        let summary = summarize(&responses, test.passing_marks);
        attempt.submitted_at = Some(now);
        attempt.status = if summary.pending_review == 0 {
            AttemptStatus::Graded
        } else {
            AttemptStatus::Submitted
        };

        self.store
            .complete_attempt(attempt.clone(), responses)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    WorkflowError::validation("this attempt has already been submitted")
                }
                other => other.into(),
            })?;
        self.store
            .set_assignment_status(attempt.assignment_id, AssignmentStatus::Completed)?;

        info!(
            attempt_id = attempt_id.0,
            percentage = summary.percentage,
            passed = summary.passed,
            pending_review = summary.pending_review,
            "test attempt submitted"
        );
        Ok(AttemptReport { attempt, summary })
    }

    /// Record a monitoring signal. Exceeding the tab-switch allowance flags the attempt.
    pub fn record_proctoring_event(
        &self,
        attempt_id: AttemptId,
        event: ProctoringEvent,
    ) -> Result<TestAttempt, WorkflowError> {
        let mut attempt = self.load_attempt(attempt_id)?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(WorkflowError::validation("this attempt is no longer running"));
        }
        let assignment = self
            .store
            .fetch_assignment(attempt.assignment_id)?
            .ok_or_else(|| WorkflowError::not_found("assignment", attempt.assignment_id.0))?;
        let Some(settings) = assignment.proctoring else {
            return Ok(attempt);
        };

        match event {
            ProctoringEvent::TabSwitch if settings.tab_switch_detection => {
                attempt.tab_switches += 1;
                if settings
                    .max_tab_switches
                    .is_some_and(|allowed| attempt.tab_switches > allowed)
                {
                    attempt.flagged = true;
                }
            }
            ProctoringEvent::FullscreenExit if settings.fullscreen => {}
            ProctoringEvent::CopyPaste if settings.copy_paste_prevention => {}
            _ => return Ok(attempt),
        }

        self.store
            .update_attempt(attempt.clone(), AttemptStatus::InProgress)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    WorkflowError::validation("this attempt is no longer running")
                }
                other => other.into(),
            })?;
        if attempt.flagged {
            warn!(
                attempt_id = attempt_id.0,
                ?event,
                tab_switches = attempt.tab_switches,
                "attempt flagged for review"
            );
        } else {
            info!(attempt_id = attempt_id.0, ?event, "proctoring event recorded");
        }
        Ok(attempt)
    }

    fn window_for(
        &self,
        test: &Test,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> WindowProposal {
        let grace = self.policy.grace_minutes;
        let ends_at = ends_at.unwrap_or_else(|| propose_end(starts_at, test.duration_minutes, grace));
        WindowProposal {
            test_id: test.id,
            starts_at,
            ends_at,
            check: validate_window(starts_at, ends_at, test.duration_minutes, grace),
        }
    }

    fn load_test(&self, id: TestId) -> Result<Test, WorkflowError> {
        self.store
            .fetch_test(id)?
            .ok_or_else(|| WorkflowError::not_found("test", id.0))
    }

    fn load_attempt(&self, id: AttemptId) -> Result<TestAttempt, WorkflowError> {
        self.store
            .fetch_attempt(id)?
            .ok_or_else(|| WorkflowError::not_found("attempt", id.0))
    }
}

fn validate_question(draft: &QuestionDraft) -> Result<(), WorkflowError> {
    if draft.prompt.trim().is_empty() {
        return Err(WorkflowError::validation("question prompt is required"));
    }
    if !draft.marks.is_finite() || draft.marks <= 0.0 {
        return Err(WorkflowError::validation(
            "question marks must be a positive number",
        ));
    }

    if draft.kind.is_choice() {
        if draft.options.len() < 2 {
            return Err(WorkflowError::validation(
                "choice questions need at least two options",
            ));
        }
        if let Some(index) = draft
            .correct_options
            .iter()
            .find(|index| **index >= draft.options.len())
        {
            return Err(WorkflowError::validation(format!(
                "correct option {index} does not exist"
            )));
        }
        match (draft.kind, draft.correct_options.len()) {
            (QuestionKind::McqSingle, 1) => {}
            (QuestionKind::McqSingle, _) => {
                return Err(WorkflowError::validation(
                    "single choice questions need exactly one correct option",
                ))
            }
            (_, 0) => {
                return Err(WorkflowError::validation(
                    "multiple choice questions need at least one correct option",
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::workflows::access::Role;
    use crate::workflows::assessment::domain::{Answer, Difficulty, ProctoringSettings};
    use crate::workflows::jobs::{JobDraft, JobService, JobStatus};
    use crate::workflows::pipeline::{ApplicationSubmission, CandidateProfile, PipelineService};
    use chrono::TimeZone;

    struct Fixture {
        service: AssessmentService<InMemoryStore>,
        pipeline: PipelineService<InMemoryStore>,
        owner: RequestContext,
        application: Application,
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, hour, minute, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let owner = RequestContext::new(5, 10, Role::Hr);
        let jobs = JobService::new(store.clone());
        let job = jobs
            .create(
                &owner,
                JobDraft {
                    title: "Platform Engineer".to_string(),
                    department: None,
                    description: String::new(),
                    location: None,
                    compensation: None,
                    status: Some(JobStatus::Active),
                },
                at(8, 0),
            )
            .expect("job");
        let pipeline = PipelineService::new(store.clone());
        let application = pipeline
            .submit(
                ApplicationSubmission {
                    job_id: job.id,
                    candidate: CandidateProfile {
                        name: "Grace Hopper".to_string(),
                        email: "grace@example.com".to_string(),
                        phone: None,
                        department: None,
                        skills: vec!["cobol".to_string()],
                    },
                    resume_score: Some(88),
                },
                at(8, 5),
            )
            .expect("application");

        Fixture {
            service: AssessmentService::new(store, AssessmentPolicy::default()),
            pipeline,
            owner,
            application,
        }
    }

    fn draft(duration_minutes: u32) -> TestDraft {
        TestDraft {
            title: "Rust fundamentals".to_string(),
            description: String::new(),
            duration_minutes,
            passing_marks: Some(50),
            is_proctored: true,
            proctoring: ProctoringSettings {
                tab_switch_detection: true,
                max_tab_switches: Some(1),
                ..ProctoringSettings::default()
            },
        }
    }

    fn choice(correct: usize, marks: f64) -> QuestionDraft {
        QuestionDraft {
            kind: QuestionKind::McqSingle,
            prompt: "Which keyword moves a closure's captures?".to_string(),
            options: vec!["ref".into(), "move".into(), "mut".into()],
            correct_answer: None,
            correct_options: vec![correct],
            marks,
            difficulty: Difficulty::Easy,
        }
    }

    fn authored_test(f: &Fixture, duration: u32) -> Test {
        let test = f
            .service
            .create_test(&f.owner, draft(duration), at(8, 0))
            .expect("test");
        f.service
            .add_question(&f.owner, test.id, choice(1, 4.0))
            .expect("question");
        f.service
            .add_question(
                &f.owner,
                test.id,
                QuestionDraft {
                    kind: QuestionKind::Text,
                    prompt: "Explain borrowing".to_string(),
                    options: Vec::new(),
                    correct_answer: None,
                    correct_options: Vec::new(),
                    marks: 6.0,
                    difficulty: Difficulty::Medium,
                },
            )
            .expect("question")
    }

    #[test]
    fn questions_update_test_totals() {
        let f = fixture();
        let test = authored_test(&f, 30);
        assert_eq!(test.question_count, 2);
        assert_eq!(test.total_marks, 10.0);
    }

    #[test]
    fn single_choice_needs_one_correct_option() {
        let f = fixture();
        let test = f
            .service
            .create_test(&f.owner, draft(30), at(8, 0))
            .expect("test");
        let mut bad = choice(1, 2.0);
        bad.correct_options = vec![0, 1];
        assert!(matches!(
            f.service.add_question(&f.owner, test.id, bad),
            Err(WorkflowError::ValidationFailed(_))
        ));
        assert!(matches!(
            f.service.add_question(&f.owner, test.id, choice(7, 2.0)),
            Err(WorkflowError::ValidationFailed(_))
        ));
    }

    #[test]
    fn short_windows_are_rejected_before_any_write() {
        let f = fixture();
        let test = authored_test(&f, 60);
        let err = f
            .service
            .assign(
                &f.owner,
                AssignmentRequest {
                    test_id: test.id,
                    application_id: f.application.id,
                    starts_at: at(10, 0),
                    ends_at: Some(at(11, 0)),
                },
                at(9, 0),
            )
            .expect_err("window too short");
        assert!(err.to_string().contains("65"));

        let unchanged = f.pipeline.get(&f.owner, f.application.id).expect("app");
        assert_eq!(unchanged.status, ApplicationStatus::Submitted);
    }

    #[test]
    fn assigning_proposes_end_and_schedules_the_application() {
        let f = fixture();
        let test = authored_test(&f, 60);
        let outcome = f
            .service
            .assign(
                &f.owner,
                AssignmentRequest {
                    test_id: test.id,
                    application_id: f.application.id,
                    starts_at: at(10, 0),
                    ends_at: None,
                },
                at(9, 0),
            )
            .expect("assigned");

        assert_eq!(outcome.assignment.ends_at, at(11, 5));
        assert!(outcome.assignment.proctoring.is_some());
        let update = outcome.status_update.expect("pipeline moved");
        assert_eq!(update.application.status, ApplicationStatus::TestScheduled);
        assert!(update.change.note.contains("Grace Hopper"));
    }

    #[test]
    fn attempt_flow_grades_and_flags() {
        let f = fixture();
        let test = authored_test(&f, 30);
        let assignment = f
            .service
            .assign(
                &f.owner,
                AssignmentRequest {
                    test_id: test.id,
                    application_id: f.application.id,
                    starts_at: at(10, 0),
                    ends_at: Some(at(12, 0)),
                },
                at(9, 0),
            )
            .expect("assigned")
            .assignment;

        assert!(f.service.start_attempt(assignment.id, at(9, 30)).is_err());
        let attempt = f
            .service
            .start_attempt(assignment.id, at(10, 0))
            .expect("started");
        assert_eq!(attempt.deadline, at(10, 30));
        assert!(f.service.start_attempt(assignment.id, at(10, 1)).is_err());

        f.service
            .record_proctoring_event(attempt.id, ProctoringEvent::TabSwitch)
            .expect("first switch");
        let flagged = f
            .service
            .record_proctoring_event(attempt.id, ProctoringEvent::TabSwitch)
            .expect("second switch");
        assert_eq!(flagged.tab_switches, 2);
        assert!(flagged.flagged);

        let questions = f.service.questions(&f.owner, test.id).expect("questions");
        let report = f
            .service
            .submit_attempt(
                attempt.id,
                vec![SubmittedAnswer {
                    question_id: questions[0].id,
                    answer: Answer::Options(vec![1]),
                }],
                at(10, 20),
            )
            .expect("submitted");

        assert_eq!(report.summary.total_score, 4.0);
        assert_eq!(report.summary.total_possible, 10.0);
        assert_eq!(report.summary.percentage, 40);
        assert!(!report.summary.passed);
        assert_eq!(report.attempt.status, AttemptStatus::Graded);
        assert!(f
            .service
            .submit_attempt(attempt.id, Vec::new(), at(10, 21))
            .is_err());
    }

    #[test]
    fn late_submissions_are_refused() {
        let f = fixture();
        let test = authored_test(&f, 30);
        let assignment = f
            .service
            .assign(
                &f.owner,
                AssignmentRequest {
                    test_id: test.id,
                    application_id: f.application.id,
                    starts_at: at(10, 0),
                    ends_at: None,
                },
                at(9, 0),
            )
            .expect("assigned")
            .assignment;
        let attempt = f
            .service
            .start_attempt(assignment.id, at(10, 0))
            .expect("started");

        let err = f
            .service
            .submit_attempt(attempt.id, Vec::new(), at(10, 36))
            .expect_err("past deadline plus grace");
        assert!(matches!(err, WorkflowError::ValidationFailed(_)));
    }

    #[test]
    fn other_recruiters_cannot_author_questions() {
        let f = fixture();
        let test = authored_test(&f, 30);
        let stranger = RequestContext::new(8, 10, Role::Recruiter);
        assert!(matches!(
            f.service.add_question(&stranger, test.id, choice(0, 1.0)),
            Err(WorkflowError::Unauthorized)
        ));
    }
}
