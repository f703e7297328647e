//! Shared fixtures for integration tests.

use std::sync::Arc;

use decider::adapters::collaborators::{MockAnalyzer, MockTestGenerator};
use decider::adapters::memory::InMemorySessionStore;
use decider::domain::models::WorkflowConfig;
use decider::domain::ports::SessionStore;
use decider::services::SessionEngine;

/// Engine over `store` with echoing collaborators and default workflow settings.
#[allow(dead_code)]
pub fn engine_over(store: Arc<dyn SessionStore>, analyzer: MockAnalyzer) -> SessionEngine {
    SessionEngine::new(
        store,
        Arc::new(analyzer),
        Arc::new(MockTestGenerator::new()),
        WorkflowConfig::default(),
    )
}

/// Engine with an in-memory store the test keeps a handle to.
#[allow(dead_code)]
pub fn memory_engine() -> (SessionEngine, InMemorySessionStore) {
    let store = InMemorySessionStore::new();
    let engine = engine_over(Arc::new(store.clone()), MockAnalyzer::echo());
    (engine, store)
}

/// Initializes a test tracing subscriber once per binary.
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
