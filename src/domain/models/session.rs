/// Domain models for review sessions.
///
/// A session tracks one requirements analysis from its first draft to approval or
/// rejection: the current artifact, every piece of human feedback in arrival order,
/// the score history and the version used for optimistic concurrency.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::command::Verb;
use super::test_suite::TestSuite;
use crate::domain::errors::{DomainError, DomainResult};

/// Session workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Session object built, analyzer not yet invoked
    Created,
    /// Initial analysis in flight
    Analyzing,
    /// Artifact ready for human review
    AwaitingReview,
    /// Human approved, test generation in flight
    Approved,
    /// Test suite generated
    Completed,
    /// Human rejected the analysis
    Rejected,
}

impl SessionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Analyzing => "ANALYZING",
            Self::AwaitingReview => "AWAITING_REVIEW",
            Self::Approved => "APPROVED",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CREATED" => Some(Self::Created),
            "ANALYZING" => Some(Self::Analyzing),
            "AWAITING_REVIEW" => Some(Self::AwaitingReview),
            "APPROVED" => Some(Self::Approved),
            "COMPLETED" => Some(Self::Completed),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Valid status transitions from this status.
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Created => vec![Self::Analyzing],
            Self::Analyzing => vec![Self::AwaitingReview],
            Self::AwaitingReview => vec![Self::AwaitingReview, Self::Approved, Self::Rejected],
            Self::Approved => vec![Self::Completed],
            Self::Completed | Self::Rejected => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }

    /// Whether a command with `verb` may be applied to a session in this status.
    ///
    /// `start` is never accepted here: it is only valid when no session exists.
    pub const fn accepts(&self, verb: Verb) -> bool {
        if verb.is_read_only() {
            return true;
        }
        match self {
            Self::AwaitingReview => !matches!(verb, Verb::Start),
            _ => false,
        }
    }

    /// Verbs a human may issue next.
    pub fn available_actions(&self) -> Vec<Verb> {
        Verb::ALL
            .into_iter()
            .filter(|verb| *verb != Verb::Start && self.accepts(*verb))
            .collect()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of human interaction recorded in the feedback timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Review,
    Refine,
    Enhance,
    Edited,
    Approval,
    Rejection,
}

impl FeedbackKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Refine => "refine",
            Self::Enhance => "enhance",
            Self::Edited => "edited",
            Self::Approval => "approval",
            Self::Rejection => "rejection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review" => Some(Self::Review),
            "refine" => Some(Self::Refine),
            "enhance" => Some(Self::Enhance),
            "edited" => Some(Self::Edited),
            "approval" => Some(Self::Approval),
            "rejection" => Some(Self::Rejection),
            _ => None,
        }
    }

    /// Kinds that produce a new artifact and advance the iteration counter.
    pub const fn advances_iteration(&self) -> bool {
        matches!(self, Self::Refine | Self::Enhance | Self::Edited)
    }
}

/// One human interaction. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Position in the session timeline, starting at 0
    pub sequence: u64,

    /// Iteration that was active when the event was recorded
    pub iteration: u32,

    pub kind: FeedbackKind,

    /// Free-text payload, may be empty
    pub text: String,

    /// Review score (1-10), present only for reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,

    pub timestamp: DateTime<Utc>,
}

/// Review session with artifact, feedback timeline and score history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub session_id: String,

    /// Current workflow status
    pub status: SessionStatus,

    /// Number of artifact-producing mutations applied, starting at 1
    pub iteration: u32,

    /// Requirements text the session was started with
    pub original_request: String,

    /// Latest analysis content
    pub current_artifact: String,

    /// Context fragments added via `enhance`, carried into every analyzer call
    #[serde(default)]
    pub accumulated_context: Vec<String>,

    /// One score per review, in order
    #[serde(default)]
    pub score_history: Vec<u8>,

    /// Append-only interaction timeline
    #[serde(default)]
    pub feedback_history: Vec<FeedbackEvent>,

    pub rejection_reason: Option<String>,

    /// Test suite produced on approval
    #[serde(default)]
    pub test_suite: Option<TestSuite>,

    /// Incremented on every mutation; 0 means never persisted
    pub version: u64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an unpersisted session in `CREATED` status.
    pub fn new(session_id: impl Into<String>, original_request: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            status: SessionStatus::Created,
            iteration: 1,
            original_request: original_request.into(),
            current_artifact: String::new(),
            accumulated_context: Vec::new(),
            score_history: Vec::new(),
            feedback_history: Vec::new(),
            rejection_reason: None,
            test_suite: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fails with `InvalidTransition` unless the current status accepts `verb`.
    pub fn ensure_accepts(&self, verb: Verb) -> DomainResult<()> {
        if self.status.accepts(verb) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                session_id: self.session_id.clone(),
                status: self.status,
                verb,
            })
        }
    }

    /// Moves to `status` if the transition table allows it.
    fn transition_to(&mut self, status: SessionStatus, verb: Verb) -> DomainResult<()> {
        if !self.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition {
                session_id: self.session_id.clone(),
                status: self.status,
                verb,
            });
        }
        self.status = status;
        Ok(())
    }

    fn record(&mut self, kind: FeedbackKind, text: impl Into<String>, score: Option<u8>) {
        let event = FeedbackEvent {
            sequence: self.feedback_history.len() as u64,
            iteration: self.iteration,
            kind,
            text: text.into(),
            score,
            timestamp: Utc::now(),
        };
        self.feedback_history.push(event);
    }

    /// Closes a mutation: one version bump per applied transition.
    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// `start`: CREATED -> ANALYZING. Not a persisted state on its own.
    pub fn begin_analysis(&mut self) -> DomainResult<()> {
        self.transition_to(SessionStatus::Analyzing, Verb::Start)
    }

    /// `start`: ANALYZING -> AWAITING_REVIEW with the first artifact.
    pub fn complete_analysis(&mut self, artifact: String) -> DomainResult<()> {
        self.transition_to(SessionStatus::AwaitingReview, Verb::Start)?;
        self.current_artifact = artifact;
        self.iteration = 1;
        self.touch();
        Ok(())
    }

    pub fn apply_refinement(&mut self, feedback: &str, artifact: String) -> DomainResult<()> {
        self.ensure_accepts(Verb::Refine)?;
        self.record(FeedbackKind::Refine, feedback, None);
        self.current_artifact = artifact;
        self.iteration += 1;
        self.touch();
        Ok(())
    }

    /// The context fragment must already be part of the analyzer input that produced `artifact`.
    pub fn apply_enhancement(&mut self, context: &str, artifact: String) -> DomainResult<()> {
        self.ensure_accepts(Verb::Enhance)?;
        self.accumulated_context.push(context.to_string());
        self.record(FeedbackKind::Enhance, context, None);
        self.current_artifact = artifact;
        self.iteration += 1;
        self.touch();
        Ok(())
    }

    pub fn apply_edit(&mut self, content: &str) -> DomainResult<()> {
        self.ensure_accepts(Verb::Edited)?;
        self.record(FeedbackKind::Edited, content, None);
        self.current_artifact = content.to_string();
        self.iteration += 1;
        self.touch();
        Ok(())
    }

    pub fn apply_review(&mut self, score: u8, feedback: &str) -> DomainResult<()> {
        self.ensure_accepts(Verb::Review)?;
        self.record(FeedbackKind::Review, feedback, Some(score));
        self.score_history.push(score);
        self.touch();
        Ok(())
    }

    /// `approved`: AWAITING_REVIEW -> APPROVED -> COMPLETED once the suite exists.
    pub fn apply_approval(&mut self, note: &str, suite: TestSuite) -> DomainResult<()> {
        self.ensure_accepts(Verb::Approved)?;
        self.transition_to(SessionStatus::Approved, Verb::Approved)?;
        self.record(FeedbackKind::Approval, note, None);
        self.test_suite = Some(suite);
        self.transition_to(SessionStatus::Completed, Verb::Approved)?;
        self.touch();
        Ok(())
    }

    pub fn apply_rejection(&mut self, reason: &str) -> DomainResult<()> {
        self.ensure_accepts(Verb::Rejected)?;
        self.transition_to(SessionStatus::Rejected, Verb::Rejected)?;
        self.record(FeedbackKind::Rejection, reason, None);
        self.rejection_reason = if reason.is_empty() {
            None
        } else {
            Some(reason.to_string())
        };
        self.touch();
        Ok(())
    }

    /// Number of recorded events of the given kind
    pub fn count(&self, kind: FeedbackKind) -> usize {
        self.feedback_history
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
