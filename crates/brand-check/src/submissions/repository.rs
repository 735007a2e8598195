use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{Submission, SubmissionId};
use crate::analysis::AnalysisReport;

/// Storage abstraction over the hosted survey table.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    /// All submissions, newest first.
    fn list(&self) -> Result<Vec<Submission>, RepositoryError>;
    fn update_report(
        &self,
        id: &SubmissionId,
        report: AnalysisReport,
    ) -> Result<(), RepositoryError>;
    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("submission already exists")]
    Conflict,
    #[error("submission not found")]
    NotFound,
    #[error("submission store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store. Writes are last-write-wins per record.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<SubmissionId, Submission>>>,
}

impl InMemorySubmissionRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SubmissionId, Submission>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&submission.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Submission>, RepositoryError> {
        let mut records: Vec<Submission> = self.lock()?.values().cloned().collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(records)
    }

    fn update_report(
        &self,
        id: &SubmissionId,
        report: AnalysisReport,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.report = Some(report);
        Ok(())
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
