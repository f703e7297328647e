//! Domain errors for the decider review workflow.

use std::time::Duration;

use thiserror::Error;

use super::models::{SessionStatus, Verb};

/// Reasons a raw command line could not be turned into a [`Command`](super::models::Command).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown verb: {0}")]
    UnknownVerb(String),

    #[error("Missing session id for '{0}'")]
    MissingSessionId(Verb),

    #[error("Missing argument for '{0}'")]
    MissingArgument(Verb),

    #[error("'{0}' takes no argument besides the session id")]
    UnexpectedArgument(Verb),

    #[error("Invalid score: {0}. Use 'score:<1-10>; feedback:<text>'")]
    InvalidScore(String),
}

/// Failures of the external Analyzer/TestGenerator collaborators.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("{collaborator} failed: {message}")]
    Failed {
        collaborator: &'static str,
        message: String,
    },

    #[error("{collaborator} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        collaborator: &'static str,
        timeout: Duration,
    },
}

impl CollaboratorError {
    /// Convenience constructor for a failed collaborator call.
    pub fn failed(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            collaborator,
            message: message.into(),
        }
    }
}

/// Domain-level errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid transition: '{verb}' is not allowed for session {session_id} in status {status}")]
    InvalidTransition {
        session_id: String,
        status: SessionStatus,
        verb: Verb,
    },

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Concurrent modification of session {session_id}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        session_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Whether resubmitting the identical command (after a reload) can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Collaborator(_) | Self::ConcurrentModification { .. }
        )
    }

    /// Stable machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::SessionNotFound(_) => "session_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Collaborator(_) => "collaborator_error",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::Storage(_) => "storage_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let timeout = DomainError::from(CollaboratorError::TimedOut {
            collaborator: "analyzer",
            timeout: Duration::from_secs(5),
        });
        assert!(timeout.is_retryable());

        let conflict = DomainError::ConcurrentModification {
            session_id: "s1".to_string(),
            expected: 2,
            actual: 3,
        };
        assert!(conflict.is_retryable());

        assert!(!DomainError::SessionNotFound("s1".to_string()).is_retryable());
        assert!(!DomainError::from(ParseError::Empty).is_retryable());
        assert!(!DomainError::InvalidTransition {
            session_id: "s1".to_string(),
            status: SessionStatus::Completed,
            verb: Verb::Refine,
        }
        .is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = DomainError::from(CollaboratorError::TimedOut {
            collaborator: "test_generator",
            timeout: Duration::from_secs(30),
        });
        assert_eq!(
            err.to_string(),
            "Collaborator error: test_generator timed out after 30s"
        );

        let err = DomainError::InvalidTransition {
            session_id: "s1".to_string(),
            status: SessionStatus::Rejected,
            verb: Verb::Approved,
        };
        assert!(err.to_string().contains("'approved'"));
        assert!(err.to_string().contains("REJECTED"));
        assert_eq!(err.kind(), "invalid_transition");
    }
}
