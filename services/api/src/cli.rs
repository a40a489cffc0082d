use crate::demo::{run_demo, run_markers, run_status, DemoArgs, MarkersArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use claim_triage::config::AppConfig;
use claim_triage::error::AppError;
use claim_triage::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Claim Triage",
    about = "Score corporate debt claims from the command line or over HTTP",
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
    /// Evaluate the financial marker battery for a statement file
    Markers(MarkersArgs),
    /// Normalize a registry status string
    Status {
        /// Raw status text, e.g. "Исключен из ЕГРЮЛ 12.03.2023"
        text: String,
    },
    /// Walk through markers, status normalization and both stages on built-in samples
    Demo(DemoArgs),
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
        Command::Markers(args) => {
            let config = offline_config()?;
            run_markers(args, &config)
        }
        Command::Status { text } => {
            offline_config()?;
            run_status(&text)
        }
        Command::Demo(args) => {
            let config = offline_config()?;
            run_demo(args, &config)
        }
    }
}

/// One-shot commands keep stdout for their JSON output.
fn offline_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;
    Ok(config)
}
