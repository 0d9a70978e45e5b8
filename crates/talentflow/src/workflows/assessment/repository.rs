use crate::store::RepositoryError;
use crate::workflows::access::OrganizationId;
use crate::workflows::pipeline::ApplicationId;

use super::domain::{
    AssignmentId, AssignmentStatus, AttemptId, AttemptStatus, MarkAdjustment,
    MarkAdjustmentRequest, Question, Response, ResponseId, Test, TestAssignment, TestAttempt,
    TestId,
};

/// Storage abstraction for tests, their assignments, and graded attempts.
pub trait AssessmentRepository: Send + Sync {
    fn insert_test(&self, test: Test) -> Result<Test, RepositoryError>;
    fn fetch_test(&self, id: TestId) -> Result<Option<Test>, RepositoryError>;
    fn tests_for_organization(&self, organization: OrganizationId)
        -> Result<Vec<Test>, RepositoryError>;

    /// Store the question and fold its marks into the owning test's totals.
    fn insert_question(&self, question: Question) -> Result<Test, RepositoryError>;
    fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, RepositoryError>;

    fn insert_assignment(
        &self,
        assignment: TestAssignment,
    ) -> Result<TestAssignment, RepositoryError>;
    fn fetch_assignment(&self, id: AssignmentId)
        -> Result<Option<TestAssignment>, RepositoryError>;
    fn assignments_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<TestAssignment>, RepositoryError>;
    fn set_assignment_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<TestAssignment, RepositoryError>;

    /// Open an attempt. An assignment holds at most one attempt.
    fn insert_attempt(&self, attempt: TestAttempt) -> Result<TestAttempt, RepositoryError>;
    fn fetch_attempt(&self, id: AttemptId) -> Result<Option<TestAttempt>, RepositoryError>;
    /// Replace an attempt only while its stored status is still `expected`.
    ///
    /// Returns `Conflict` when another write moved the attempt on first.
    fn update_attempt(
        &self,
        attempt: TestAttempt,
        expected: AttemptStatus,
    ) -> Result<(), RepositoryError>;
    /// Close an in-progress attempt and store its responses as one write.
    fn complete_attempt(
        &self,
        attempt: TestAttempt,
        responses: Vec<Response>,
    ) -> Result<(), RepositoryError>;

    fn fetch_response(&self, id: ResponseId) -> Result<Option<Response>, RepositoryError>;
    fn responses_for_attempt(&self, attempt_id: AttemptId)
        -> Result<Vec<Response>, RepositoryError>;
    /// Clamp and write one mark together with its audit entry.
    ///
    /// The raw mark is clamped against the stored maximum inside the same write, so
    /// a response never holds a partially applied change.
    fn adjust_response_mark(
        &self,
        request: MarkAdjustmentRequest,
    ) -> Result<(Response, MarkAdjustment), RepositoryError>;
    fn mark_adjustments(&self, attempt_id: AttemptId)
        -> Result<Vec<MarkAdjustment>, RepositoryError>;
}
