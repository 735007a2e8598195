use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::admin::ListQuery;
use super::domain::{SubmissionDetail, SubmissionForm, SubmissionId, SubmissionSummary};
use super::notification::Notifier;
use super::repository::{RepositoryError, SubmissionRepository};
use super::service::{SurveyService, SurveyServiceError};
use crate::analysis::{AnalysisReport, LanguageModel, ReportRequest};

type SharedService<R, N, M> = Arc<SurveyService<R, N, M>>;

/// Stateless analysis body. Scores arrive raw so count errors map to 400.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePayload {
    #[serde(default)]
    pub scores: Vec<i64>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub business_phase: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Router builder exposing the survey, result, and admin endpoints.
pub fn submission_router<R, N, M>(service: SharedService<R, N, M>) -> Router
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<R, N, M>))
        .route(
            "/api/v1/submissions/:submission_id",
            get(open_handler::<R, N, M>),
        )
        .route(
            "/api/v1/submissions/:submission_id/report",
            post(regenerate_handler::<R, N, M>).put(save_report_handler::<R, N, M>),
        )
        .route("/api/v1/analyze", post(analyze_handler::<R, N, M>))
        .route(
            "/api/v1/admin/submissions",
            get(list_handler::<R, N, M>),
        )
        .route(
            "/api/v1/admin/submissions/export",
            get(export_handler::<R, N, M>),
        )
        .route(
            "/api/v1/admin/submissions/:submission_id",
            axum::routing::delete(delete_handler::<R, N, M>),
        )
        .with_state(service)
}

fn parse_id(raw: &str) -> Option<SubmissionId> {
    Uuid::parse_str(raw).ok().map(SubmissionId)
}

fn not_found() -> Response {
    let payload = json!({
        "error": RepositoryError::NotFound.to_string(),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn error_response(error: SurveyServiceError) -> Response {
    let status = match &error {
        SurveyServiceError::Validation(_) | SurveyServiceError::SchemaMismatch { .. } => {
            StatusCode::BAD_REQUEST
        }
        SurveyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SurveyServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SurveyServiceError::Analysis(_) => StatusCode::BAD_GATEWAY,
        SurveyServiceError::Repository(RepositoryError::Unavailable(_))
        | SurveyServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    axum::Json(form): axum::Json<SubmissionForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    match service.submit(form).await {
        Ok(record) => (
            StatusCode::CREATED,
            axum::Json(SubmissionDetail::from(&record)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn open_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    let Some(id) = parse_id(&submission_id) else {
        return not_found();
    };
    match service.open(&id).await {
        Ok(record) => (StatusCode::OK, axum::Json(SubmissionDetail::from(&record))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn regenerate_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    let Some(id) = parse_id(&submission_id) else {
        return not_found();
    };
    match service.regenerate(&id).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_report_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Path(submission_id): Path<String>,
    axum::Json(report): axum::Json<AnalysisReport>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    let Some(id) = parse_id(&submission_id) else {
        return not_found();
    };
    match service.save_report(&id, report) {
        Ok(record) => (StatusCode::OK, axum::Json(SubmissionDetail::from(&record))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analyze_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    axum::Json(payload): axum::Json<AnalyzePayload>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    let request = match ReportRequest::new(
        &payload.scores,
        payload.memo,
        payload.business_phase,
        payload.company_name,
    ) {
        Ok(request) => request,
        Err(error) => return error_response(error.into()),
    };
    match service.analyze(&request).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    match service.list(&query) {
        Ok(records) => {
            let rows: Vec<SubmissionSummary> = records.iter().map(|record| record.summary()).collect();
            (StatusCode::OK, axum::Json(rows)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    match service.export_csv(&query) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"brand-check-submissions.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, N, M>(
    State(service): State<SharedService<R, N, M>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: Notifier + 'static,
    M: LanguageModel + 'static,
{
    let Some(id) = parse_id(&submission_id) else {
        return not_found();
    };
    match service.delete(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
