mod cli;
mod config;
mod controller;
mod error;
mod exit_codes;
mod generator;
mod groq;
mod logging;
mod oracle;
mod state_machine;
mod store;
mod target;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use cli::Cli;
use config::{API_KEY_ENV, AgentConfig};
use controller::WorkflowController;
use generator::ParserGenerator;
use groq::GroqClient;
use oracle::CommandOracle;
use state_machine::RunReport;
use store::FsArtifactStore;
use target::Target;
use ui::RunProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let progress = RunProgress::new();
    logging::init(progress.bar());
    let cli = Cli::parse();

    match run(cli, &progress).await {
        Ok(report) if report.succeeded() => ExitCode::from(exit_codes::VERIFIED),
        Ok(_) => ExitCode::from(exit_codes::EXHAUSTED),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_codes::FATAL)
        }
    }
}

async fn run(cli: Cli, progress: &RunProgress) -> Result<RunReport> {
    let config = AgentConfig::load()?;
    let target = Target::parse(&cli.target)?;
    if config.api_key.is_empty() {
        warn!("{API_KEY_ENV} is not set; generation requests will fail");
    }

    let client = GroqClient::with_base_url(config.api_key.clone(), config.api_url.clone())?;
    let controller = WorkflowController::new(
        ParserGenerator::from_config(client, &config),
        FsArtifactStore::new(&config.artifact_dir),
        CommandOracle::new(config.oracle_command.clone()),
    )
    .with_step_limit(config.step_limit)
    .with_report_feedback(
        config
            .feedback_report
            .then_some(config.feedback_report_limit),
    );

    progress.start(&target);
    match controller.run(target, progress).await {
        Ok(report) => {
            progress.print_report(&report);
            Ok(report)
        }
        Err(err) => {
            progress.abandon();
            Err(err.into())
        }
    }
}
