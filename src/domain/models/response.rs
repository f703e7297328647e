//! Response object returned for every command.

use serde::{Deserialize, Serialize};

use super::command::Verb;
use super::insights::{FeedbackMetrics, HitlInsights};
use super::session::{FeedbackEvent, Session, SessionStatus};
use super::suggestion::SuggestionRecord;
use super::test_suite::TestSuite;
use crate::domain::errors::DomainError;

/// Error details carried by a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Machine-readable error kind, e.g. `invalid_transition`
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&DomainError> for ResponseError {
    fn from(err: &DomainError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Verb that produced the response, when the command parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<Verb>,

    /// Session status after the command, when a session exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,

    pub session_id: String,

    pub iteration: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_artifact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FeedbackMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<SuggestionRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<HitlInsights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_history: Option<Vec<FeedbackEvent>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite: Option<TestSuite>,

    #[serde(default)]
    pub available_actions: Vec<Verb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl CommandResponse {
    /// Base response describing `session` after `verb` was applied.
    pub fn for_session(verb: Verb, session: &Session) -> Self {
        Self {
            verb: Some(verb),
            status: Some(session.status),
            session_id: session.session_id.clone(),
            iteration: session.iteration,
            current_artifact: None,
            score: None,
            metrics: None,
            suggestions: None,
            insights: None,
            feedback_history: None,
            test_suite: None,
            available_actions: session.status.available_actions(),
            error: None,
        }
    }

    /// Response for a command that failed before or during its transition.
    pub fn from_error(verb: Option<Verb>, session_id: impl Into<String>, err: &DomainError) -> Self {
        Self {
            verb,
            status: None,
            session_id: session_id.into(),
            iteration: 0,
            current_artifact: None,
            score: None,
            metrics: None,
            suggestions: None,
            insights: None,
            feedback_history: None,
            test_suite: None,
            available_actions: Vec::new(),
            error: Some(ResponseError::from(err)),
        }
    }

    #[must_use]
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.current_artifact = Some(artifact.into());
        self
    }

    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
