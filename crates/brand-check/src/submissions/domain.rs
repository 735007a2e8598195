use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisReport, ReportRequest};
use crate::assessment::{rating_label, ScoreSet, ValidationError};

const UNFILLED: &str = "未記入";
const UNSELECTED: &str = "未選択";

/// Identifier wrapper for persisted submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Raw survey answers as posted by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionForm {
    pub company_name: String,
    pub respondent_name: String,
    pub respondent_email: String,
    pub industry: String,
    pub business_phase: String,
    pub revenue_scale: String,
    pub mission: String,
    pub vision_future: String,
    pub challenges: Vec<String>,
    pub other_challenge: String,
    pub agreed_to_privacy: bool,
    pub scores: Vec<i64>,
}

impl SubmissionForm {
    /// Check required fields and scores; nothing external is touched on failure.
    pub fn validate(&self) -> Result<ScoreSet, ValidationError> {
        for (value, field) in [
            (&self.company_name, "company_name"),
            (&self.respondent_name, "respondent_name"),
            (&self.respondent_email, "respondent_email"),
            (&self.business_phase, "business_phase"),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let scores = ScoreSet::new(&self.scores)?;

        if !self.agreed_to_privacy {
            return Err(ValidationError::PrivacyNotAccepted);
        }

        Ok(scores)
    }
}

/// Persisted survey response plus its optional analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
    pub company_name: String,
    pub respondent_name: String,
    pub respondent_email: String,
    pub industry: Option<String>,
    pub business_phase: String,
    pub revenue_scale: Option<String>,
    pub mission: Option<String>,
    pub vision_future: Option<String>,
    pub challenges: Vec<String>,
    pub other_challenge: Option<String>,
    pub scores: ScoreSet,
    pub avg_score: f64,
    pub report: Option<AnalysisReport>,
}

impl Submission {
    pub fn from_form(
        form: SubmissionForm,
        scores: ScoreSet,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            created_at,
            company_name: form.company_name.trim().to_string(),
            respondent_name: form.respondent_name.trim().to_string(),
            respondent_email: form.respondent_email.trim().to_string(),
            industry: filled(form.industry),
            business_phase: form.business_phase.trim().to_string(),
            revenue_scale: filled(form.revenue_scale),
            mission: filled(form.mission),
            vision_future: filled(form.vision_future),
            challenges: form
                .challenges
                .into_iter()
                .filter(|challenge| !challenge.trim().is_empty())
                .collect(),
            other_challenge: filled(form.other_challenge),
            avg_score: scores.average(),
            scores,
            report: None,
        }
    }

    /// Mission, vision, and challenges folded into the memo the model reads.
    pub fn memo(&self) -> String {
        let challenges = if self.challenges.is_empty() {
            UNSELECTED.to_string()
        } else {
            self.challenges.join("、")
        };
        let other = self
            .other_challenge
            .as_deref()
            .map(|text| format!("\nその他: {text}"))
            .unwrap_or_default();

        format!(
            "【企業理念】\n{}\n\n【3〜5年後のビジョン】\n{}\n\n【課題】\n{}{}",
            self.mission.as_deref().unwrap_or(UNFILLED),
            self.vision_future.as_deref().unwrap_or(UNFILLED),
            challenges,
            other
        )
    }

    pub fn report_request(&self) -> ReportRequest {
        ReportRequest {
            scores: self.scores,
            memo: Some(self.memo()),
            business_phase: self.business_phase.clone(),
            company_name: Some(self.company_name.clone()),
        }
    }

    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            id: self.id,
            created_at: self.created_at,
            company_name: self.company_name.clone(),
            respondent_name: self.respondent_name.clone(),
            respondent_email: self.respondent_email.clone(),
            industry: self.industry.clone(),
            business_phase: self.business_phase.clone(),
            avg_score: self.avg_score,
            avg_score_display: self.scores.average_display(),
            rating: rating_label(self.avg_score),
            has_report: self.report.is_some(),
        }
    }
}

fn filled(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Admin list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSummary {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
    pub company_name: String,
    pub respondent_name: String,
    pub respondent_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub business_phase: String,
    pub avg_score: f64,
    pub avg_score_display: String,
    pub rating: &'static str,
    pub has_report: bool,
}

/// Per-category row for the result view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScoreView {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub score: u8,
    pub rating: &'static str,
}

/// Full result page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub summary: SubmissionSummary,
    pub categories: Vec<CategoryScoreView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
}

impl From<&Submission> for SubmissionDetail {
    fn from(submission: &Submission) -> Self {
        let categories = submission
            .scores
            .pairs()
            .map(|(category, score)| CategoryScoreView {
                key: category.storage_key(),
                label: category.label(),
                description: category.description(),
                score,
                rating: rating_label(f64::from(score)),
            })
            .collect();

        Self {
            summary: submission.summary(),
            categories,
            report: submission.report.clone(),
        }
    }
}
