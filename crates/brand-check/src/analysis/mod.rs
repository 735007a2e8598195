//! Report derivation: prompt construction, model call, reply parsing, and
//! priority annotation.

pub mod model;
pub mod parser;
pub mod priority;
pub mod prompt;
pub mod report;

use std::sync::Arc;

use tracing::{debug, info};

pub use model::{AnthropicClient, LanguageModel, LlmError};
pub use parser::{extract_json_block, parse_reply, ReportParseError};
pub use priority::{annotate, annotate_report, Priority};
pub use prompt::{PromptBuilder, ReportRequest};
pub use report::{AnalysisReport, LegacyReport, PrioritizedReport, ReportSchema};

use crate::assessment::ScoreSet;

/// Error raised while turning a request into a report.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Model(#[from] LlmError),
    #[error(transparent)]
    Parse(#[from] ReportParseError),
}

/// Parse a raw model reply into a report of the given schema and prioritize it.
pub fn derive_report(
    schema: ReportSchema,
    reply: &str,
    scores: &ScoreSet,
) -> Result<AnalysisReport, ReportParseError> {
    let payload = parse_reply(reply)?;
    let report = AnalysisReport::from_payload(schema, payload);
    Ok(annotate_report(report, scores))
}

/// Runs one request through the model for the deployment's report schema.
pub struct ReportGenerator<M> {
    model: Arc<M>,
    prompts: PromptBuilder,
}

impl<M> ReportGenerator<M>
where
    M: LanguageModel + 'static,
{
    pub fn new(model: Arc<M>, schema: ReportSchema) -> Self {
        Self {
            model,
            prompts: PromptBuilder::new(schema),
        }
    }

    pub fn schema(&self) -> ReportSchema {
        self.prompts.schema()
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<AnalysisReport, AnalysisError> {
        let prompt = self.prompts.build(request);
        let reply = self.model.complete(&prompt).await?;
        debug!(reply_chars = reply.chars().count(), "model reply received");

        let report = derive_report(self.schema(), &reply, &request.scores)?;
        info!(schema = %self.schema(), "analysis report derived");
        Ok(report)
    }
}
