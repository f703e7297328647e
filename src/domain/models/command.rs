//! Typed commands produced by the command parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Command verbs understood by the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Start,
    Refine,
    Enhance,
    Edited,
    Review,
    Approved,
    Rejected,
    FeedbackHistory,
    SuggestImprovements,
}

impl Verb {
    /// Every verb, in grammar order.
    pub const ALL: [Self; 9] = [
        Self::Start,
        Self::Approved,
        Self::Rejected,
        Self::Refine,
        Self::Enhance,
        Self::Review,
        Self::Edited,
        Self::FeedbackHistory,
        Self::SuggestImprovements,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Refine => "refine",
            Self::Enhance => "enhance",
            Self::Edited => "edited",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::FeedbackHistory => "feedback_history",
            Self::SuggestImprovements => "suggest_improvements",
        }
    }

    /// Case-insensitive lookup of a verb by name.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == lower)
    }

    /// Read-only verbs never mutate a session and are accepted in every status.
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::FeedbackHistory | Self::SuggestImprovements)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed human command. Each variant carries exactly the arguments its verb needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a session; `session_id` is `None` when the caller left it empty.
    Start {
        requirements: String,
        session_id: Option<String>,
    },
    Refine {
        feedback: String,
        session_id: String,
    },
    Enhance {
        context: String,
        session_id: String,
    },
    Edited {
        content: String,
        session_id: String,
    },
    Review {
        score: u8,
        feedback: String,
        session_id: String,
    },
    Approved {
        note: String,
        session_id: String,
    },
    Rejected {
        reason: String,
        session_id: String,
    },
    FeedbackHistory {
        session_id: String,
    },
    SuggestImprovements {
        session_id: String,
    },
}

impl Command {
    pub const fn verb(&self) -> Verb {
        match self {
            Self::Start { .. } => Verb::Start,
            Self::Refine { .. } => Verb::Refine,
            Self::Enhance { .. } => Verb::Enhance,
            Self::Edited { .. } => Verb::Edited,
            Self::Review { .. } => Verb::Review,
            Self::Approved { .. } => Verb::Approved,
            Self::Rejected { .. } => Verb::Rejected,
            Self::FeedbackHistory { .. } => Verb::FeedbackHistory,
            Self::SuggestImprovements { .. } => Verb::SuggestImprovements,
        }
    }

    /// Target session, `None` only for a `start` without an explicit id.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Start { session_id, .. } => session_id.as_deref(),
            Self::Refine { session_id, .. }
            | Self::Enhance { session_id, .. }
            | Self::Edited { session_id, .. }
            | Self::Review { session_id, .. }
            | Self::Approved { session_id, .. }
            | Self::Rejected { session_id, .. }
            | Self::FeedbackHistory { session_id }
            | Self::SuggestImprovements { session_id } => Some(session_id),
        }
    }
}
