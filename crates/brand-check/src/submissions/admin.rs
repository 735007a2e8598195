use std::cmp::Ordering;

use chrono::SecondsFormat;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

use super::domain::Submission;
use crate::assessment::CATEGORIES;

/// Column used to order the admin list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    AvgScore,
    CompanyName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter and ordering options for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub business_phase: Option<String>,
    pub industry: Option<String>,
    pub min_avg: Option<f64>,
    pub max_avg: Option<f64>,
    pub has_report: Option<bool>,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::trim) {
            if !needle.is_empty() && !search_matches(submission, needle) {
                return false;
            }
        }
        if let Some(phase) = non_blank(&self.business_phase) {
            if submission.business_phase != phase {
                return false;
            }
        }
        if let Some(industry) = non_blank(&self.industry) {
            if submission.industry.as_deref() != Some(industry) {
                return false;
            }
        }
        if self.min_avg.is_some_and(|min| submission.avg_score < min) {
            return false;
        }
        if self.max_avg.is_some_and(|max| submission.avg_score > max) {
            return false;
        }
        if let Some(wanted) = self.has_report {
            if submission.report.is_some() != wanted {
                return false;
            }
        }
        true
    }

    fn compare(&self, left: &Submission, right: &Submission) -> Ordering {
        let ordering = match self.sort {
            SortKey::CreatedAt => left.created_at.cmp(&right.created_at),
            SortKey::AvgScore => left.avg_score.total_cmp(&right.avg_score),
            SortKey::CompanyName => left.company_name.cmp(&right.company_name),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter then stable-sort the given submissions.
    pub fn apply(&self, submissions: Vec<Submission>) -> Vec<Submission> {
        let mut selected: Vec<Submission> = submissions
            .into_iter()
            .filter(|submission| self.matches(submission))
            .collect();
        selected.sort_by(|left, right| self.compare(left, right));
        selected
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn search_matches(submission: &Submission, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        Some(submission.company_name.as_str()),
        Some(submission.respondent_name.as_str()),
        Some(submission.respondent_email.as_str()),
        submission.industry.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output was not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub fn csv_header() -> Vec<&'static str> {
    let mut header = vec![
        "ID",
        "作成日時",
        "会社名",
        "回答者名",
        "メールアドレス",
        "業界",
        "ビジネスフェーズ",
        "平均スコア",
    ];
    header.extend(CATEGORIES.iter().map(|category| category.label()));
    header.push("AIレポート");
    header
}

fn csv_row(submission: &Submission) -> Vec<String> {
    let mut row = vec![
        submission.id.to_string(),
        submission
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        submission.company_name.clone(),
        submission.respondent_name.clone(),
        submission.respondent_email.clone(),
        submission.industry.clone().unwrap_or_default(),
        submission.business_phase.clone(),
        submission.scores.average_display(),
    ];
    row.extend(submission.scores.values().iter().map(u8::to_string));
    row.push(if submission.report.is_some() { "有" } else { "無" }.to_string());
    row
}

/// Render submissions as CSV with every field quoted.
pub fn export_csv(submissions: &[Submission]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(csv_header())?;
    for submission in submissions {
        writer.write_record(csv_row(submission))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
