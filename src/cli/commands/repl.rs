//! `decider repl`: one command per stdin line, one response per command.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::cli::output::CommandOutput;
use crate::domain::models::Config;
use crate::services::SessionEngine;

use super::build_engine;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let engine = build_engine(config).await?;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let handled = serve(&engine, stdin, &mut stdout, json).await?;
    tracing::info!(commands = handled, "REPL finished");
    Ok(())
}

/// Processes lines from `input` until EOF or an exit word.
///
/// In JSON mode every response is written as a single line. Returns the number
/// of commands handled.
pub async fn serve<R, W>(engine: &SessionEngine, input: R, out: &mut W, json: bool) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        let response = engine.handle_line(line).await;
        let rendered = if json {
            serde_json::to_string(&response)?
        } else {
            format!("{}\n", response.to_human())
        };
        out.write_all(rendered.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        handled += 1;
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::collaborators::{MockAnalyzer, MockTestGenerator};
    use crate::adapters::memory::InMemorySessionStore;
    use crate::domain::models::{CommandResponse, SessionStatus, WorkflowConfig};
    use std::sync::Arc;

    fn engine() -> SessionEngine {
        SessionEngine::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(MockAnalyzer::echo()),
            Arc::new(MockTestGenerator::new()),
            WorkflowConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_json_lines_until_exit() {
        let input = b"start; Basic login; s1\n\n# comment\nreview; score:9; feedback:good; s1\nexit\nrejected; ; s1\n";
        let mut out = Vec::new();

        let handled = serve(&engine(), &input[..], &mut out, true).await.unwrap();
        assert_eq!(handled, 2);

        let text = String::from_utf8(out).unwrap();
        let responses: Vec<CommandResponse> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1].score, Some(9));
        assert_eq!(responses[1].status, Some(SessionStatus::AwaitingReview));
    }

    #[tokio::test]
    async fn test_human_output() {
        let input = b"feedback_history; nope\n";
        let mut out = Vec::new();
        serve(&engine(), &input[..], &mut out, false).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Error [session_not_found]"));
    }
}
