//! Analyzer and test generator implementations.
//!
//! - `template`: deterministic, offline collaborators used by the CLI
//! - `mock`: scripted collaborators for tests

pub mod mock;
pub mod template;

pub use mock::{MockAnalyzer, MockResponse, MockTestGenerator};
pub use template::{TemplateAnalyzer, TemplateTestGenerator};
