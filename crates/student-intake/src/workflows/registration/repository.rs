use std::collections::BTreeSet;

use super::domain::{NewSubmission, Submission, SubmissionId};

/// Storage abstraction so the service can be exercised against any record store.
///
/// Implementations must reject an `insert` whose `submission_code` already exists with
/// [`RepositoryError::Conflict`]; the service relies on that check to resolve concurrent
/// submissions that derived the same code.
pub trait SubmissionRepository: Send + Sync {
    /// Persist a new submission, assigning its id and submission timestamp.
    fn insert(&self, submission: NewSubmission) -> Result<Submission, RepositoryError>;
    fn update(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    fn fetch(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError>;
    /// Every submission, newest first.
    fn all(&self) -> Result<Vec<Submission>, RepositoryError>;
    /// Submissions matching [`Submission::matches`], newest first.
    fn search(&self, query: &str) -> Result<Vec<Submission>, RepositoryError>;
    /// Snapshot of every issued tracking code.
    fn codes(&self) -> Result<BTreeSet<String>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("submission code already exists: {0}")]
    Conflict(String),
    #[error("submission not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Order by `submission_date` descending, breaking ties by id descending.
pub fn sort_newest_first(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| {
        b.submission_date
            .cmp(&a.submission_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
