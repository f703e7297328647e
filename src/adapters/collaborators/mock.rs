//! Mock collaborators for testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::CollaboratorError;
use crate::domain::models::{TestCase, TestKind, TestPriority, TestSuite};
use crate::domain::ports::{AnalysisRequest, Analyzer, TestGenerator};

/// Scripted collaborator outcome.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Output text, ignored on failure
    pub output: String,
    /// Whether to simulate failure
    pub fail: bool,
    /// Error message if failing
    pub error_message: Option<String>,
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            fail: false,
            error_message: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            fail: true,
            error_message: Some(error.into()),
        }
    }
}

#[derive(Default)]
struct AnalyzerState {
    scripted: VecDeque<MockResponse>,
    failure: Option<String>,
    requests: Vec<AnalysisRequest>,
}

/// Analyzer that echoes its input unless a response has been scripted.
///
/// Clones share state, so a test can keep a handle after moving one into the engine.
#[derive(Clone, Default)]
pub struct MockAnalyzer {
    state: Arc<RwLock<AnalyzerState>>,
    delay: Option<Duration>,
}

impl MockAnalyzer {
    pub fn echo() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response for the next call.
    pub async fn respond_with(&self, response: MockResponse) {
        self.state.write().await.scripted.push_back(response);
    }

    /// Fail every unscripted call from now on.
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<AnalysisRequest> {
        self.state.read().await.requests.clone()
    }

    fn echo_output(call: usize, request: &AnalysisRequest) -> String {
        let mut output = format!("Analysis #{call}: {}", request.original_request);
        for fragment in &request.accumulated_context {
            output.push_str("\nContext: ");
            output.push_str(fragment);
        }
        if let Some(refine) = &request.refine_text {
            output.push_str("\nRefined: ");
            output.push_str(refine);
        }
        output
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn name(&self) -> &'static str {
        "mock_analyzer"
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<String, CollaboratorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().await;
        state.requests.push(request.clone());
        let call = state.requests.len();

        let scripted = state.scripted.pop_front();
        let response = match (scripted, state.failure.clone()) {
            (Some(scripted), _) => scripted,
            (None, Some(message)) => MockResponse::failure(message),
            (None, None) => MockResponse::success(Self::echo_output(call, &request)),
        };

        if response.fail {
            return Err(CollaboratorError::failed(
                self.name(),
                response
                    .error_message
                    .unwrap_or_else(|| "Mock failure".to_string()),
            ));
        }
        Ok(response.output)
    }
}

#[derive(Default)]
struct GeneratorState {
    failure: Option<String>,
    artifacts: Vec<String>,
}

/// Test generator returning a single functional case per artifact.
#[derive(Clone, Default)]
pub struct MockTestGenerator {
    state: Arc<RwLock<GeneratorState>>,
}

impl MockTestGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Artifacts received, in order.
    pub async fn artifacts(&self) -> Vec<String> {
        self.state.read().await.artifacts.clone()
    }
}

#[async_trait]
impl TestGenerator for MockTestGenerator {
    fn name(&self) -> &'static str {
        "mock_test_generator"
    }

    async fn generate(&self, artifact: &str) -> Result<TestSuite, CollaboratorError> {
        let mut state = self.state.write().await;
        state.artifacts.push(artifact.to_string());

        if let Some(message) = &state.failure {
            return Err(CollaboratorError::failed(self.name(), message.clone()));
        }

        let case = TestCase {
            test_id: "TC_FUNC_001".to_string(),
            priority: TestPriority::High,
            kind: TestKind::Functional,
            summary: "Approved artifact behaves as described".to_string(),
            preconditions: Vec::new(),
            test_steps: vec!["Exercise the approved behaviour".to_string()],
            expected_result: "Behaviour matches the artifact".to_string(),
            requirement_traceability: artifact.lines().next().unwrap_or_default().to_string(),
        };
        Ok(TestSuite::new("Mock suite", "Generated by the mock", vec![case]))
    }
}
