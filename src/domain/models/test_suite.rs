//! Structured test suites handed back by the test generator on approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test case priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestPriority {
    Critical,
    High,
    Medium,
    Low,
}

/// Test case category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Functional,
    Security,
    EdgeCase,
    Negative,
}

impl TestKind {
    /// Prefix used in generated test ids, e.g. `TC_SEC_001`.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Functional => "FUNC",
            Self::Security => "SEC",
            Self::EdgeCase => "EDGE",
            Self::Negative => "NEG",
        }
    }
}

/// One structured test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub test_id: String,
    pub priority: TestPriority,
    pub kind: TestKind,
    pub summary: String,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub test_steps: Vec<String>,
    pub expected_result: String,
    /// Requirement the case was derived from
    pub requirement_traceability: String,
}

/// Collection of generated test cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub description: String,
    pub total_tests: usize,
    pub generated_at: DateTime<Utc>,
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        test_cases: Vec<TestCase>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            total_tests: test_cases.len(),
            generated_at: Utc::now(),
            test_cases,
        }
    }
}
