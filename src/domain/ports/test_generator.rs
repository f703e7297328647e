//! Test generator port - turns an approved artifact into a test suite.

use async_trait::async_trait;

use crate::domain::errors::CollaboratorError;
use crate::domain::models::TestSuite;

/// Trait for test generation backends.
#[async_trait]
pub trait TestGenerator: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, artifact: &str) -> Result<TestSuite, CollaboratorError>;
}
