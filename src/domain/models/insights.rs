//! Quality analytics and feedback insight values.

use serde::{Deserialize, Serialize};

/// Direction of the review scores between the first and the latest review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

/// Result of analysing a score history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Mean score, one decimal
    pub average: f64,
    pub trend: Trend,
    /// Average score change per review; display only
    pub velocity: f64,
}

/// How actively the human has been steering the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    Low,
    Medium,
    High,
}

/// Aggregate metrics over a session's feedback timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMetrics {
    pub quality: QualityReport,
    pub iteration: u32,
    pub total_feedback_items: usize,
    pub review_count: usize,
    pub refinement_count: usize,
    pub enhancement_count: usize,
    pub edit_count: usize,
    pub approval_count: usize,
}

/// Behavioural insights about the review loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitlInsights {
    pub feedback_frequency: usize,
    pub refinement_cycles: usize,
    pub engagement: Engagement,
    pub recommended_actions: Vec<String>,
}
