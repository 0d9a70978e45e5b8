use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::workflows::access::{OrganizationId, Recruiter};
use crate::workflows::assessment::{
    clamp_mark, AssessmentRepository, AssignmentId, AssignmentStatus, AttemptId, AttemptStatus,
    MarkAdjustment, MarkAdjustmentRequest, Question, Response, ResponseId, Test, TestAssignment,
    TestAttempt, TestId,
};
use crate::workflows::jobs::{Job, JobId, JobRepository, RecruiterDirectory};
use crate::workflows::pipeline::{Application, ApplicationId, ApplicationRepository, StatusChange};

use super::RepositoryError;

#[derive(Default)]
struct JobTables {
    jobs: BTreeMap<JobId, Job>,
    recruiters: HashMap<OrganizationId, Vec<Recruiter>>,
}

#[derive(Default)]
struct ApplicationTables {
    applications: BTreeMap<ApplicationId, Application>,
    history: HashMap<ApplicationId, Vec<StatusChange>>,
}

#[derive(Default)]
struct AssessmentTables {
    tests: BTreeMap<TestId, Test>,
    questions: BTreeMap<TestId, Vec<Question>>,
    assignments: BTreeMap<AssignmentId, TestAssignment>,
    attempts: BTreeMap<AttemptId, TestAttempt>,
    responses: BTreeMap<ResponseId, Response>,
    adjustments: Vec<MarkAdjustment>,
}

/// Process-local store backing every repository trait. Used by the API binary and tests.
///
/// Each table group sits behind its own mutex; writes that must land together
/// (status plus history, mark plus audit entry) happen under one guard.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    jobs: Arc<Mutex<JobTables>>,
    applications: Arc<Mutex<ApplicationTables>>,
    assessments: Arc<Mutex<AssessmentTables>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, table: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{table} table lock poisoned")))
}

impl InMemoryStore {
    /// Register the recruiters that may be assigned to jobs of `organization`.
    pub fn seed_recruiters(&self, organization: OrganizationId, recruiters: Vec<Recruiter>) {
        let mut guard = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        guard.recruiters.insert(organization, recruiters);
    }
}

impl JobRepository for InMemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.jobs, "jobs")?;
        if guard.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs, "jobs")?;
        match guard.jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = lock(&self.jobs, "jobs")?;
        Ok(guard.jobs.get(&id).cloned())
    }

    fn jobs_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Job>, RepositoryError> {
        let guard = lock(&self.jobs, "jobs")?;
        Ok(guard
            .jobs
            .values()
            .filter(|job| job.organization_id == organization)
            .cloned()
            .collect())
    }
}

impl RecruiterDirectory for InMemoryStore {
    fn recruiters(&self, organization: OrganizationId) -> Result<Vec<Recruiter>, RepositoryError> {
        let guard = lock(&self.jobs, "jobs")?;
        Ok(guard
            .recruiters
            .get(&organization)
            .cloned()
            .unwrap_or_default())
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        if guard.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard.applications.get(&id).cloned())
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard
            .applications
            .values()
            .filter(|application| application.job_id == job_id)
            .cloned()
            .collect())
    }

    fn apply_status_change(
        &self,
        id: ApplicationId,
        change: StatusChange,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        let application = guard
            .applications
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if application.status != change.from {
            return Err(RepositoryError::Conflict);
        }
        application.status = change.to;
        application.updated_at = change.changed_at;
        let updated = application.clone();
        guard.history.entry(id).or_default().push(change);
        Ok(updated)
    }

    fn status_history(&self, id: ApplicationId) -> Result<Vec<StatusChange>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard.history.get(&id).cloned().unwrap_or_default())
    }
}

impl AssessmentRepository for InMemoryStore {
    fn insert_test(&self, test: Test) -> Result<Test, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        if guard.tests.contains_key(&test.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.tests.insert(test.id, test.clone());
        Ok(test)
    }

    fn fetch_test(&self, id: TestId) -> Result<Option<Test>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard.tests.get(&id).cloned())
    }

    fn tests_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Test>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard
            .tests
            .values()
            .filter(|test| test.organization_id == organization)
            .cloned()
            .collect())
    }

    fn insert_question(&self, question: Question) -> Result<Test, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let tables = &mut *guard;
        let test = tables
            .tests
            .get_mut(&question.test_id)
            .ok_or(RepositoryError::NotFound)?;
        let questions = tables.questions.entry(question.test_id).or_default();
        if questions.iter().any(|existing| existing.id == question.id) {
            return Err(RepositoryError::Conflict);
        }
        questions.push(question);

        test.question_count = questions.len() as u32;
        test.total_marks = questions.iter().map(|q| q.marks).sum();
        Ok(test.clone())
    }

    fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard.questions.get(&test_id).cloned().unwrap_or_default())
    }

    fn insert_assignment(
        &self,
        assignment: TestAssignment,
    ) -> Result<TestAssignment, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        if guard.assignments.contains_key(&assignment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn fetch_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<TestAssignment>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard.assignments.get(&id).cloned())
    }

    fn assignments_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<TestAssignment>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard
            .assignments
            .values()
            .filter(|assignment| assignment.application_id == application_id)
            .cloned()
            .collect())
    }

    fn set_assignment_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<TestAssignment, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let assignment = guard
            .assignments
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        assignment.status = status;
        Ok(assignment.clone())
    }

    fn insert_attempt(&self, attempt: TestAttempt) -> Result<TestAttempt, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let taken = guard.attempts.values().any(|existing| {
            existing.id == attempt.id || existing.assignment_id == attempt.assignment_id
        });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    fn fetch_attempt(&self, id: AttemptId) -> Result<Option<TestAttempt>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard.attempts.get(&id).cloned())
    }

    fn update_attempt(
        &self,
        attempt: TestAttempt,
        expected: AttemptStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let slot = guard
            .attempts
            .get_mut(&attempt.id)
            .ok_or(RepositoryError::NotFound)?;
        if slot.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *slot = attempt;
        Ok(())
    }

    fn complete_attempt(
        &self,
        attempt: TestAttempt,
        responses: Vec<Response>,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let slot = guard
            .attempts
            .get_mut(&attempt.id)
            .ok_or(RepositoryError::NotFound)?;
        if slot.status != AttemptStatus::InProgress {
            return Err(RepositoryError::Conflict);
        }
        *slot = attempt;
        for response in responses {
            guard.responses.insert(response.id, response);
        }
        Ok(())
    }

    fn fetch_response(&self, id: ResponseId) -> Result<Option<Response>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard.responses.get(&id).cloned())
    }

    fn responses_for_attempt(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<Response>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard
            .responses
            .values()
            .filter(|response| response.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    fn adjust_response_mark(
        &self,
        request: MarkAdjustmentRequest,
    ) -> Result<(Response, MarkAdjustment), RepositoryError> {
        let mut guard = lock(&self.assessments, "assessments")?;
        let response = guard
            .responses
            .get_mut(&request.response_id)
            .ok_or(RepositoryError::NotFound)?;

        let previous = response.marks_awarded;
        response.marks_awarded = clamp_mark(request.raw_marks, response.max_marks);
        response.needs_review = false;
        let updated = response.clone();

        let adjustment = MarkAdjustment {
            response_id: request.response_id,
            previous,
            new: updated.marks_awarded,
            reason: request.reason,
            adjusted_by: request.adjusted_by,
            adjusted_at: request.adjusted_at,
        };
        guard.adjustments.push(adjustment.clone());
        Ok((updated, adjustment))
    }

    fn mark_adjustments(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<MarkAdjustment>, RepositoryError> {
        let guard = lock(&self.assessments, "assessments")?;
        Ok(guard
            .adjustments
            .iter()
            .filter(|adjustment| {
                guard
                    .responses
                    .get(&adjustment.response_id)
                    .is_some_and(|response| response.attempt_id == attempt_id)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::access::UserId;
    use crate::workflows::assessment::{QuestionId, ResponseId};
    use chrono::{TimeZone, Utc};

    fn response(id: i64, max: f64) -> Response {
        Response {
            id: ResponseId(id),
            attempt_id: AttemptId(1),
            question_id: QuestionId(id),
            answer: None,
            marks_awarded: 0.0,
            max_marks: max,
            needs_review: true,
            ai_feedback: None,
        }
    }

    fn attempt() -> TestAttempt {
        let started = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        TestAttempt {
            id: AttemptId(1),
            assignment_id: AssignmentId(1),
            test_id: TestId(1),
            started_at: started,
            deadline: started + chrono::Duration::minutes(30),
            submitted_at: None,
            status: AttemptStatus::InProgress,
            tab_switches: 0,
            flagged: false,
        }
    }

    #[test]
    fn mark_adjustment_clamps_and_audits_in_one_write() {
        let store = InMemoryStore::default();
        store.insert_attempt(attempt()).expect("attempt");
        let mut submitted = attempt();
        submitted.status = AttemptStatus::Submitted;
        store
            .complete_attempt(submitted, vec![response(1, 10.0)])
            .expect("complete");

        let (updated, audit) = store
            .adjust_response_mark(MarkAdjustmentRequest {
                response_id: ResponseId(1),
                raw_marks: 14.0,
                reason: "rubric allows full credit".to_string(),
                adjusted_by: UserId(5),
                adjusted_at: Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap(),
            })
            .expect("adjust");

        assert_eq!(updated.marks_awarded, 10.0);
        assert!(!updated.needs_review);
        assert_eq!((audit.previous, audit.new), (0.0, 10.0));
        assert_eq!(store.mark_adjustments(AttemptId(1)).unwrap(), vec![audit]);
    }

    #[test]
    fn attempts_complete_once() {
        let store = InMemoryStore::default();
        store.insert_attempt(attempt()).expect("attempt");
        let mut submitted = attempt();
        submitted.status = AttemptStatus::Submitted;

        store
            .complete_attempt(submitted.clone(), Vec::new())
            .expect("first submit");
        assert!(matches!(
            store.complete_attempt(submitted, Vec::new()),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            store.insert_attempt(attempt()),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn stale_attempt_write_cannot_reopen_a_submitted_attempt() {
        let store = InMemoryStore::default();
        store.insert_attempt(attempt()).expect("attempt");
        let read_before_submit = store
            .fetch_attempt(AttemptId(1))
            .unwrap()
            .expect("stored");

        let mut submitted = attempt();
        submitted.status = AttemptStatus::Submitted;
        store
            .complete_attempt(submitted.clone(), vec![response(1, 5.0)])
            .expect("submit");

        let mut stale = read_before_submit;
        stale.tab_switches += 1;
        assert!(matches!(
            store.update_attempt(stale, AttemptStatus::InProgress),
            Err(RepositoryError::Conflict)
        ));
        let stored = store.fetch_attempt(AttemptId(1)).unwrap().expect("stored");
        assert_eq!(stored.status, AttemptStatus::Submitted);
        assert_eq!(stored.tab_switches, 0);

        assert!(matches!(
            store.complete_attempt(submitted, vec![response(2, 5.0)]),
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(store.responses_for_attempt(AttemptId(1)).unwrap().len(), 1);
    }

    #[test]
    fn unknown_response_is_not_found() {
        let store = InMemoryStore::default();
        let result = store.adjust_response_mark(MarkAdjustmentRequest {
            response_id: ResponseId(77),
            raw_marks: 1.0,
            reason: "x".to_string(),
            adjusted_by: UserId(1),
            adjusted_at: Utc::now(),
        });
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
