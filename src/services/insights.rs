//! Feedback metrics and review-loop insights for a session.

use crate::domain::models::{Engagement, FeedbackKind, FeedbackMetrics, HitlInsights, Session};
use crate::services::quality_analytics;

const BREAK_DOWN_ACTION: &str =
    "Consider breaking down the analysis into smaller, more focused sections";
const LOW_QUALITY_ACTION: &str =
    "Quality scores are low - consider requesting more specific human feedback";
const UNCLEAR_REQUIREMENTS_ACTION: &str =
    "Multiple refinements detected - consider asking for clearer initial requirements";

/// Scores below this mark the session as low quality.
const LOW_SCORE: u8 = 6;

pub fn metrics(session: &Session) -> FeedbackMetrics {
    FeedbackMetrics {
        quality: quality_analytics::analyze(&session.score_history),
        iteration: session.iteration,
        total_feedback_items: session.feedback_history.len(),
        review_count: session.count(FeedbackKind::Review),
        refinement_count: session.count(FeedbackKind::Refine),
        enhancement_count: session.count(FeedbackKind::Enhance),
        edit_count: session.count(FeedbackKind::Edited),
        approval_count: session.count(FeedbackKind::Approval),
    }
}

pub fn insights(session: &Session) -> HitlInsights {
    let feedback_frequency = session.feedback_history.len();
    let refinement_cycles = session.count(FeedbackKind::Refine);

    let engagement = match feedback_frequency {
        n if n > 3 => Engagement::High,
        n if n > 1 => Engagement::Medium,
        _ => Engagement::Low,
    };

    let mut recommended_actions = Vec::new();
    if feedback_frequency > 3 {
        recommended_actions.push(BREAK_DOWN_ACTION.to_string());
    }
    if session.score_history.iter().any(|score| *score < LOW_SCORE) {
        recommended_actions.push(LOW_QUALITY_ACTION.to_string());
    }
    if refinement_cycles > 2 {
        recommended_actions.push(UNCLEAR_REQUIREMENTS_ACTION.to_string());
    }

    HitlInsights {
        feedback_frequency,
        refinement_cycles,
        engagement,
        recommended_actions,
    }
}
