//! `decider run`: execute a single command line.

use anyhow::Result;

use crate::cli::output::output;
use crate::domain::models::Config;

use super::build_engine;

/// Returns whether the command succeeded.
pub async fn execute(line: &str, config: &Config, json: bool) -> Result<bool> {
    let engine = build_engine(config).await?;
    let response = engine.handle_line(line).await;
    output(&response, json);
    Ok(!response.is_error())
}
