//! Decider CLI entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use decider::cli::{self, Cli, Commands};
use decider::infrastructure::config::ConfigLoader;
use decider::infrastructure::logging::{LogConfig, LoggerImpl};

async fn run(cli: &Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::try_from(&config.logging)?)?;
    tracing::debug!(backend = ?config.store.backend, "Configuration loaded");

    match &cli.command {
        Commands::Run { line } => cli::commands::run::execute(line, &config, cli.json).await,
        Commands::Repl => cli::commands::repl::execute(&config, cli.json).await.map(|()| true),
        Commands::Sessions { status, limit } => {
            cli::commands::sessions::execute(status.as_deref(), *limit, &config, cli.json)
                .await
                .map(|()| true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            cli::handle_error(&err, cli.json);
            ExitCode::from(2)
        }
    }
}
