//! Analyzer port - produces analysis artifacts from requirements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::CollaboratorError;

/// Input for one analyzer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Requirements text the session was started with
    pub original_request: String,
    /// Every context fragment added so far, in order
    pub accumulated_context: Vec<String>,
    /// Artifact being revised, absent for the first analysis
    pub prior_artifact: Option<String>,
    /// Human refinement feedback, present only for `refine`
    pub refine_text: Option<String>,
}

impl AnalysisRequest {
    /// Request for the first analysis of a session.
    pub fn initial(original_request: impl Into<String>) -> Self {
        Self {
            original_request: original_request.into(),
            accumulated_context: Vec::new(),
            prior_artifact: None,
            refine_text: None,
        }
    }
}

/// Trait for analysis backends.
///
/// The analyzer is opaque to the workflow: it may call an LLM, a remote agent or a
/// template engine. Calls may be slow and are not assumed idempotent.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: AnalysisRequest) -> Result<String, CollaboratorError>;
}
