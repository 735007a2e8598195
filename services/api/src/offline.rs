use brand_check::analysis::{derive_report, PromptBuilder, ReportRequest, ReportSchema};
use brand_check::assessment::ScoreSet;
use brand_check::config::AppConfig;
use brand_check::error::AppError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PromptArgs {
    /// Twelve scores (1-5) in category order, comma separated
    #[arg(long, required = true, value_delimiter = ',', value_parser = crate::infra::parse_score)]
    pub(crate) scores: Vec<i64>,
    /// Business phase shown to the model
    #[arg(long, default_value = "")]
    pub(crate) phase: String,
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Free-text memo (mission, vision, challenges)
    #[arg(long)]
    pub(crate) memo: Option<String>,
    /// Report schema (v1 or v2). Defaults to REPORT_SCHEMA.
    #[arg(long)]
    pub(crate) schema: Option<ReportSchema>,
}

#[derive(Args, Debug)]
pub(crate) struct ParseArgs {
    /// File holding the raw model reply
    pub(crate) reply: PathBuf,
    /// Scores used to prioritize improvements, comma separated
    #[arg(long, required = true, value_delimiter = ',', value_parser = crate::infra::parse_score)]
    pub(crate) scores: Vec<i64>,
    /// Report schema (v1 or v2). Defaults to REPORT_SCHEMA.
    #[arg(long)]
    pub(crate) schema: Option<ReportSchema>,
}

fn resolve_schema(requested: Option<ReportSchema>) -> Result<ReportSchema, AppError> {
    match requested {
        Some(schema) => Ok(schema),
        None => Ok(AppConfig::load()?.report_schema),
    }
}

pub(crate) fn run_prompt(args: PromptArgs) -> Result<(), AppError> {
    let schema = resolve_schema(args.schema)?;
    println!("{}", render_prompt(args, schema)?);
    Ok(())
}

pub(crate) fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let schema = resolve_schema(args.schema)?;
    let reply = std::fs::read_to_string(&args.reply)?;
    println!("{}", render_report(&reply, &args.scores, schema)?);
    Ok(())
}

fn render_prompt(args: PromptArgs, schema: ReportSchema) -> Result<String, AppError> {
    let request = ReportRequest::new(&args.scores, args.memo, args.phase, args.company)?;
    Ok(PromptBuilder::new(schema).build(&request))
}

fn render_report(reply: &str, scores: &[i64], schema: ReportSchema) -> Result<String, AppError> {
    let scores = ScoreSet::new(scores)?;
    let report = derive_report(schema, reply, &scores)?;
    Ok(serde_json::to_string_pretty(&report)?)
}
