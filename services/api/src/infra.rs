use brand_check::analysis::AnthropicClient;
use brand_check::config::AppConfig;
use brand_check::submissions::{InMemorySubmissionRepository, ResendNotifier, SurveyService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveSurveyService =
    SurveyService<InMemorySubmissionRepository, ResendNotifier, AnthropicClient>;

/// Wire the in-memory store with the Resend and Anthropic adapters.
pub(crate) fn survey_service(config: &AppConfig) -> LiveSurveyService {
    if config.llm.api_key.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; reports will not be generated");
    }
    if config.notification.api_key.is_none() || config.notification.admin_email.is_none() {
        warn!("RESEND_API_KEY or ADMIN_EMAIL is not set; admin notifications are disabled");
    }

    SurveyService::new(
        Arc::new(InMemorySubmissionRepository::default()),
        Arc::new(ResendNotifier::new(config.notification.clone())),
        Arc::new(AnthropicClient::new(config.llm.clone())),
        config.report_schema,
    )
}

/// Clap value parser for comma-separated score lists such as `3,4,2,...`.
pub(crate) fn parse_score(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|err| format!("failed to parse '{raw}' as a score ({err})"))
}
