//! `decider sessions`: list stored sessions.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, Session, SessionStatus};

use super::open_store;

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: SessionStatus,
    pub iteration: u32,
    pub reviews: usize,
    pub last_score: Option<u8>,
    pub original_request: String,
    pub updated_at: String,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            status: session.status,
            iteration: session.iteration,
            reviews: session.score_history.len(),
            last_score: session.score_history.last().copied(),
            original_request: session.original_request.clone(),
            updated_at: session.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListOutput {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}

impl CommandOutput for SessionListOutput {
    fn to_human(&self) -> String {
        if self.sessions.is_empty() {
            return "No sessions found.".to_string();
        }

        let mut table = list_table(&["id", "status", "iter", "score", "request"]);
        for session in &self.sessions {
            table.add_row(vec![
                session.session_id.clone(),
                session.status.to_string(),
                session.iteration.to_string(),
                session
                    .last_score
                    .map_or_else(|| "-".to_string(), |s| s.to_string()),
                truncate(&session.original_request, 40),
            ]);
        }
        format!("{} session(s):\n{table}", self.total)
    }
}

pub async fn execute(status: Option<&str>, limit: usize, config: &Config, json: bool) -> Result<()> {
    let status = status
        .map(|s| SessionStatus::parse(s).ok_or_else(|| anyhow!("Unknown session status: {s}")))
        .transpose()?;

    let store = open_store(config).await?;
    let sessions = store.list(status, limit).await?;

    let result = SessionListOutput {
        total: sessions.len(),
        sessions: sessions.iter().map(SessionSummary::from).collect(),
    };
    output(&result, json);
    Ok(())
}
