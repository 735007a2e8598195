//! Survey intake, result viewing, report editing, and admin tooling.

pub mod admin;
pub mod domain;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use admin::{export_csv, ExportError, ListQuery, SortKey, SortOrder};
pub use domain::{
    CategoryScoreView, Submission, SubmissionDetail, SubmissionForm, SubmissionId,
    SubmissionSummary,
};
pub use notification::{NotificationError, Notifier, ResendNotifier, SurveyNotification};
pub use repository::{InMemorySubmissionRepository, RepositoryError, SubmissionRepository};
pub use router::{submission_router, AnalyzePayload};
pub use service::{SurveyService, SurveyServiceError};
