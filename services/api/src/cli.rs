use crate::offline::{run_parse, run_prompt, ParseArgs, PromptArgs};
use crate::server;
use brand_check::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Brand Check",
    about = "Serve the brand assessment survey or work with analysis prompts offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render the analysis prompt for a set of 12 scores
    Prompt(PromptArgs),
    /// Parse a saved model reply and print the prioritized report as JSON
    Parse(ParseArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Prompt(args) => run_prompt(args),
        Command::Parse(args) => run_parse(args),
    }
}
