//! Deterministic offline collaborators.
//!
//! `TemplateAnalyzer` turns requirement text into a structured markdown artifact
//! with numbered `REQ-NNN` items. `TemplateTestGenerator` reads those items back
//! and derives functional, security, negative and edge-case tests.

use async_trait::async_trait;

use crate::domain::errors::CollaboratorError;
use crate::domain::models::{Category, TestCase, TestKind, TestPriority, TestSuite};
use crate::domain::ports::{AnalysisRequest, Analyzer, TestGenerator};
use crate::services::pattern_classifier::classify;

const REQUIREMENT_PREFIX: &str = "- REQ-";

/// Splits free text into requirement statements.
fn statements(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '\n', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Category names touched by `text`, excluding the catch-all.
fn areas(text: &str) -> Vec<Category> {
    classify(text)
        .into_keys()
        .filter(|category| *category != Category::General)
        .collect()
}

/// Builds the artifact from the request alone, so identical requests give
/// identical artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnalyzer;

impl TemplateAnalyzer {
    pub const fn new() -> Self {
        Self
    }

    fn render(request: &AnalysisRequest) -> String {
        let mut sources: Vec<&str> = statements(&request.original_request).collect();
        for fragment in &request.accumulated_context {
            sources.extend(statements(fragment));
        }
        if let Some(refine) = &request.refine_text {
            sources.extend(statements(refine));
        }

        let mut out = String::from("# Requirements Analysis\n\n## Request\n");
        out.push_str(request.original_request.trim());
        out.push_str("\n\n## Requirements\n");
        for (index, statement) in sources.iter().enumerate() {
            out.push_str(&format!("{REQUIREMENT_PREFIX}{:03}: {statement}\n", index + 1));
        }

        if !request.accumulated_context.is_empty() {
            out.push_str("\n## Context\n");
            for fragment in &request.accumulated_context {
                out.push_str(&format!("- {}\n", fragment.trim()));
            }
        }

        if let Some(refine) = &request.refine_text {
            out.push_str("\n## Revision\n");
            out.push_str(&format!("- Addressed feedback: {}\n", refine.trim()));
        }

        let touched = areas(&sources.join(" "));
        out.push_str("\n## Areas Touched\n");
        if touched.is_empty() {
            out.push_str("- none identified\n");
        } else {
            for category in touched {
                out.push_str(&format!("- {category}\n"));
            }
        }
        out
    }
}

#[async_trait]
impl Analyzer for TemplateAnalyzer {
    fn name(&self) -> &'static str {
        "template_analyzer"
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<String, CollaboratorError> {
        if request.original_request.trim().is_empty() {
            return Err(CollaboratorError::failed(self.name(), "empty requirements"));
        }
        Ok(Self::render(&request))
    }
}

/// Derives a test suite from the `REQ-NNN` items of an artifact.
///
/// Artifacts without numbered items are treated as one requirement per statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTestGenerator;

#[derive(Default)]
struct IdCounter {
    functional: u32,
    security: u32,
    edge_case: u32,
    negative: u32,
}

impl IdCounter {
    fn next(&mut self, kind: TestKind) -> String {
        let counter = match kind {
            TestKind::Functional => &mut self.functional,
            TestKind::Security => &mut self.security,
            TestKind::EdgeCase => &mut self.edge_case,
            TestKind::Negative => &mut self.negative,
        };
        *counter += 1;
        format!("TC_{}_{:03}", kind.id_prefix(), counter)
    }
}

impl TemplateTestGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// `(reference, text)` pairs for every requirement in the artifact.
    fn requirements(artifact: &str) -> Vec<(String, String)> {
        let numbered: Vec<(String, String)> = artifact
            .lines()
            .filter_map(|line| line.trim().strip_prefix(REQUIREMENT_PREFIX))
            .filter_map(|rest| rest.split_once(':'))
            .map(|(number, text)| (format!("REQ-{}", number.trim()), text.trim().to_string()))
            .collect();

        if !numbered.is_empty() {
            return numbered;
        }

        statements(artifact)
            .enumerate()
            .map(|(index, text)| (format!("REQ-{:03}", index + 1), text.to_string()))
            .collect()
    }

    const fn security_priority(category: Category) -> TestPriority {
        match category {
            Category::AccessControl | Category::Compliance | Category::PasswordPolicy => {
                TestPriority::Critical
            }
            _ => TestPriority::High,
        }
    }

    fn build(artifact: &str) -> TestSuite {
        let requirements = Self::requirements(artifact);
        let mut ids = IdCounter::default();
        let mut cases = Vec::new();

        for (reference, text) in &requirements {
            cases.push(TestCase {
                test_id: ids.next(TestKind::Functional),
                priority: TestPriority::High,
                kind: TestKind::Functional,
                summary: format!("Verify: {text}"),
                preconditions: vec!["System is deployed with default configuration".to_string()],
                test_steps: vec![
                    format!("Set up the scenario described by {reference}"),
                    "Perform the described action".to_string(),
                    "Observe the system response".to_string(),
                ],
                expected_result: format!("The system satisfies: {text}"),
                requirement_traceability: reference.clone(),
            });

            for category in areas(text) {
                cases.push(TestCase {
                    test_id: ids.next(TestKind::Security),
                    priority: Self::security_priority(category),
                    kind: TestKind::Security,
                    summary: format!("Security check ({category}): {text}"),
                    preconditions: vec!["Test accounts with differing privileges exist".to_string()],
                    test_steps: vec![
                        format!("Attempt to bypass the {category} controls of {reference}"),
                        "Inspect the response and any recorded events".to_string(),
                    ],
                    expected_result: "The attempt is refused and no data is exposed".to_string(),
                    requirement_traceability: reference.clone(),
                });
            }
        }

        if let Some((reference, _)) = requirements.first() {
            cases.push(TestCase {
                test_id: ids.next(TestKind::Negative),
                priority: TestPriority::Medium,
                kind: TestKind::Negative,
                summary: "Malformed input is rejected".to_string(),
                preconditions: Vec::new(),
                test_steps: vec!["Submit malformed or missing input".to_string()],
                expected_result: "A validation error is returned and state is unchanged".to_string(),
                requirement_traceability: reference.clone(),
            });
            cases.push(TestCase {
                test_id: ids.next(TestKind::EdgeCase),
                priority: TestPriority::Low,
                kind: TestKind::EdgeCase,
                summary: "Boundary values are handled".to_string(),
                preconditions: Vec::new(),
                test_steps: vec!["Submit minimum and maximum length input".to_string()],
                expected_result: "Input at the boundaries is accepted, beyond them rejected"
                    .to_string(),
                requirement_traceability: reference.clone(),
            });
        }

        TestSuite::new(
            "Generated Test Suite",
            format!("{} test cases from {} requirements", cases.len(), requirements.len()),
            cases,
        )
    }
}

#[async_trait]
impl TestGenerator for TemplateTestGenerator {
    fn name(&self) -> &'static str {
        "template_test_generator"
    }

    async fn generate(&self, artifact: &str) -> Result<TestSuite, CollaboratorError> {
        let suite = Self::build(artifact);
        if suite.test_cases.is_empty() {
            return Err(CollaboratorError::failed(
                self.name(),
                "artifact contains no requirements",
            ));
        }
        Ok(suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_analyzer_is_deterministic() {
        let analyzer = TemplateAnalyzer::new();
        let request = AnalysisRequest::initial("Users log in with email. Passwords are hashed");
        let first = analyzer.analyze(request.clone()).await.unwrap();
        let second = analyzer.analyze(request).await.unwrap();

        assert_eq!(first, second);
        assert!(first.contains("- REQ-001: Users log in with email"));
        assert!(first.contains("- REQ-002: Passwords are hashed"));
        assert!(first.contains("- password_policy"));
    }

    #[tokio::test]
    async fn test_analyzer_does_not_pre_empt_suggestions() {
        let artifact = TemplateAnalyzer::new()
            .analyze(AnalysisRequest::initial("Basic login"))
            .await
            .unwrap()
            .to_lowercase();

        for category in Category::KEYWORDED {
            assert!(!artifact.contains(category.recommendation()));
        }
    }

    #[tokio::test]
    async fn test_analyzer_includes_context_and_revision() {
        let request = AnalysisRequest {
            original_request: "Basic login".to_string(),
            accumulated_context: vec!["Must comply with PCI DSS".to_string()],
            prior_artifact: Some("old".to_string()),
            refine_text: Some("Add lockout after 5 attempts".to_string()),
        };
        let artifact = TemplateAnalyzer::new().analyze(request).await.unwrap();
        assert!(artifact.contains("- REQ-002: Must comply with PCI DSS"));
        assert!(artifact.contains("- REQ-003: Add lockout after 5 attempts"));
        assert!(artifact.contains("## Revision"));
    }

    #[tokio::test]
    async fn test_analyzer_rejects_empty_request() {
        let result = TemplateAnalyzer::new()
            .analyze(AnalysisRequest::initial("   "))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generator_reads_numbered_requirements() {
        let artifact = TemplateAnalyzer::new()
            .analyze(AnalysisRequest::initial("Users log in. Enforce password complexity"))
            .await
            .unwrap();
        let suite = TemplateTestGenerator::new().generate(&artifact).await.unwrap();

        let ids: Vec<&str> = suite.test_cases.iter().map(|c| c.test_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "TC_FUNC_001",
                "TC_SEC_001",
                "TC_FUNC_002",
                "TC_SEC_002",
                "TC_NEG_001",
                "TC_EDGE_001"
            ]
        );
        assert_eq!(suite.total_tests, 6);
        assert_eq!(suite.test_cases[3].priority, TestPriority::Critical);
        assert_eq!(suite.test_cases[2].requirement_traceability, "REQ-002");
    }

    #[tokio::test]
    async fn test_generator_handles_free_text() {
        let suite = TemplateTestGenerator::new()
            .generate("Show a dashboard")
            .await
            .unwrap();
        assert_eq!(suite.test_cases[0].requirement_traceability, "REQ-001");
        assert!(TemplateTestGenerator::new().generate("  ").await.is_err());
    }
}
