use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::admin::{export_csv, ExportError, ListQuery};
use super::domain::{Submission, SubmissionForm, SubmissionId};
use super::notification::{NotificationError, Notifier, SurveyNotification};
use super::repository::{RepositoryError, SubmissionRepository};
use crate::analysis::{
    AnalysisError, AnalysisReport, LanguageModel, ReportGenerator, ReportRequest, ReportSchema,
};
use crate::assessment::ValidationError;

/// Service composing storage, admin notification, and report generation.
pub struct SurveyService<R, N, M> {
    repository: Arc<R>,
    notifier: Arc<N>,
    generator: ReportGenerator<M>,
}

impl<R, N, M> SurveyService<R, N, M>
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, model: Arc<M>, schema: ReportSchema) -> Self {
        Self {
            repository,
            notifier,
            generator: ReportGenerator::new(model, schema),
        }
    }

    pub fn schema(&self) -> ReportSchema {
        self.generator.schema()
    }

    /// Store a validated survey, notify the owner, and attempt the first report.
    ///
    /// Notification and generation failures are logged; the stored record is
    /// returned either way.
    pub async fn submit(&self, form: SubmissionForm) -> Result<Submission, SurveyServiceError> {
        let scores = form.validate()?;
        let submission = Submission::from_form(form, scores, Utc::now());
        let mut stored = self.repository.insert(submission)?;
        info!(submission_id = %stored.id, company = %stored.company_name, "survey stored");

        if let Err(error) = self.notify(&stored).await {
            warn!(submission_id = %stored.id, %error, "survey notification failed");
        }

        match self.generate_for(&stored).await {
            Ok(report) => stored.report = Some(report),
            Err(error) => {
                warn!(submission_id = %stored.id, %error, "initial report generation failed");
            }
        }

        Ok(stored)
    }

    async fn notify(&self, submission: &Submission) -> Result<(), NotificationError> {
        self.notifier
            .notify(SurveyNotification::from(submission))
            .await
    }

    async fn generate_for(
        &self,
        submission: &Submission,
    ) -> Result<AnalysisReport, SurveyServiceError> {
        let report = self
            .generator
            .generate(&submission.report_request())
            .await?;
        self.repository
            .update_report(&submission.id, report.clone())?;
        Ok(report)
    }

    /// Generate and persist a report for a stored submission.
    pub async fn generate_report(
        &self,
        id: &SubmissionId,
    ) -> Result<AnalysisReport, SurveyServiceError> {
        let submission = self.get(id)?;
        self.generate_for(&submission).await
    }

    /// Fetch a submission for the result view, generating a missing report on the way.
    pub async fn open(&self, id: &SubmissionId) -> Result<Submission, SurveyServiceError> {
        let mut submission = self.get(id)?;
        if submission.report.is_none() {
            match self.generate_for(&submission).await {
                Ok(report) => submission.report = Some(report),
                Err(error) => {
                    warn!(submission_id = %id, %error, "report regeneration on open failed");
                }
            }
        }
        Ok(submission)
    }

    /// Replace the stored report with a manually edited one.
    pub fn save_report(
        &self,
        id: &SubmissionId,
        report: AnalysisReport,
    ) -> Result<Submission, SurveyServiceError> {
        let expected = self.schema();
        let found = report.schema();
        if found != expected {
            return Err(SurveyServiceError::SchemaMismatch { expected, found });
        }

        let mut submission = self.get(id)?;
        self.repository.update_report(id, report.clone())?;
        submission.report = Some(report);
        info!(submission_id = %id, "report saved manually");
        Ok(submission)
    }

    /// Discard any edits and ask the model again.
    pub async fn regenerate(&self, id: &SubmissionId) -> Result<AnalysisReport, SurveyServiceError> {
        let report = self.generate_report(id).await?;
        info!(submission_id = %id, "report regenerated");
        Ok(report)
    }

    /// One-off analysis without persistence.
    pub async fn analyze(
        &self,
        request: &ReportRequest,
    ) -> Result<AnalysisReport, SurveyServiceError> {
        Ok(self.generator.generate(request).await?)
    }

    pub fn get(&self, id: &SubmissionId) -> Result<Submission, SurveyServiceError> {
        let submission = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(submission)
    }

    pub fn list(&self, query: &ListQuery) -> Result<Vec<Submission>, SurveyServiceError> {
        Ok(query.apply(self.repository.list()?))
    }

    pub fn export_csv(&self, query: &ListQuery) -> Result<String, SurveyServiceError> {
        let submissions = self.list(query)?;
        Ok(export_csv(&submissions)?)
    }

    pub fn delete(&self, id: &SubmissionId) -> Result<(), SurveyServiceError> {
        self.repository.delete(id)?;
        info!(submission_id = %id, "submission deleted");
        Ok(())
    }
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("report schema {found} does not match the active schema {expected}")]
    SchemaMismatch {
        expected: ReportSchema,
        found: ReportSchema,
    },
}
