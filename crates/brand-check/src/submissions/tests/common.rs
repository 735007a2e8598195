use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::analysis::{AnalysisReport, LanguageModel, LlmError, ReportSchema};
use crate::submissions::domain::{Submission, SubmissionForm, SubmissionId};
use crate::submissions::notification::{NotificationError, Notifier, SurveyNotification};
use crate::submissions::repository::{RepositoryError, SubmissionRepository};
use crate::submissions::{submission_router, SurveyService};

pub(super) const PRIORITIZED_REPLY: &str = "分析結果です。\n```json\n{\"overallComment\":\"土台は整っています\",\"contradictionsAndRisks\":[\"理念と発信がずれています\"],\"improvements\":[\"コミュニケーションの一貫性\",\"市場理解の深化\"],\"phaseAdvice\":\"採用広報にも着手しましょう\"}\n```";

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        company_name: "HUV Design".to_string(),
        respondent_name: "山田 花子".to_string(),
        respondent_email: "hanako@example.com".to_string(),
        industry: "製造業".to_string(),
        business_phase: "成長中".to_string(),
        revenue_scale: "1〜5億円".to_string(),
        mission: "地域のものづくりを世界へ".to_string(),
        vision_future: String::new(),
        challenges: vec!["認知・知名度不足".to_string()],
        other_challenge: String::new(),
        agreed_to_privacy: true,
        scores: vec![2, 4, 4, 4, 4, 4, 5, 4, 4, 4, 4, 4],
    }
}

pub(super) type TestService = SurveyService<MemoryRepository, MemoryNotifier, ScriptedModel>;

pub(super) fn build_service(
    replies: &[Result<&str, ()>],
) -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
    Arc<ScriptedModel>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let model = Arc::new(ScriptedModel::new(replies));
    let service = SurveyService::new(
        repository.clone(),
        notifier.clone(),
        model.clone(),
        ReportSchema::V2,
    );
    (service, repository, notifier, model)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<SubmissionId, Submission>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &SubmissionId) -> Submission {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&submission.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<Submission> = guard.values().cloned().collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(records)
    }

    fn update_report(
        &self,
        id: &SubmissionId,
        report: AnalysisReport,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.report = Some(report);
        Ok(())
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_report(
        &self,
        _id: &SubmissionId,
        _report: AnalysisReport,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &SubmissionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<SurveyNotification>>,
    failing: bool,
}

impl MemoryNotifier {
    pub(super) fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub(super) fn events(&self) -> Vec<SurveyNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: SurveyNotification) -> Result<(), NotificationError> {
        if self.failing {
            return Err(NotificationError::NotConfigured("ADMIN_EMAIL is not set"));
        }
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Replays queued replies in order; an exhausted queue behaves like a dead upstream.
pub(super) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ()>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(super) fn new(replies: &[Result<&str, ()>]) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .iter()
                    .map(|reply| reply.map(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        self.replies
            .lock()
            .expect("reply queue poisoned")
            .pop_front()
            .unwrap_or(Err(()))
            .map_err(|_| LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            })
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    submission_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
