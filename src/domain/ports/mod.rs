//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - SessionStore: Versioned session persistence
//! - Analyzer: Produces analysis artifacts
//! - TestGenerator: Produces test suites from approved artifacts
//!
//! These traits keep the review workflow independent of any specific storage
//! engine or generation backend.

pub mod analyzer;
pub mod session_store;
pub mod test_generator;

pub use analyzer::{AnalysisRequest, Analyzer};
pub use session_store::SessionStore;
pub use test_generator::TestGenerator;
