//! Per-session serialisation and optimistic versioning.

mod common;

use std::sync::Arc;
use std::time::Duration;

use decider::adapters::collaborators::MockAnalyzer;
use decider::adapters::memory::InMemorySessionStore;
use decider::domain::errors::DomainError;
use decider::domain::models::FeedbackKind;
use decider::domain::ports::SessionStore;

use common::engine_over;

#[tokio::test]
async fn test_racing_mutations_are_serialised() {
    let store = InMemorySessionStore::new();
    let analyzer = MockAnalyzer::echo().with_delay(Duration::from_millis(20));
    let engine = Arc::new(engine_over(Arc::new(store.clone()), analyzer));
    engine.handle_line("start; Basic login; s1").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let line = if i % 2 == 0 {
                format!("refine; change {i}; s1")
            } else {
                format!("review; score:{}; feedback:pass {i}; s1", i + 1)
            };
            engine.handle_line(&line).await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert!(!response.is_error(), "{:?}", response.error);
    }

    let session = store.load("s1").await.unwrap();
    assert_eq!(session.count(FeedbackKind::Refine), 4);
    assert_eq!(session.score_history.len(), 4);
    assert_eq!(session.iteration, 5);
    assert_eq!(session.feedback_history.len(), 8);
    assert_eq!(engine.active_locks().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_do_not_block_each_other() {
    let analyzer = MockAnalyzer::echo().with_delay(Duration::from_millis(50));
    let engine = Arc::new(engine_over(Arc::new(InMemorySessionStore::new()), analyzer));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.handle_line(&format!("start; Request {i}; s{i}")).await })
        })
        .collect();

    let started = tokio::time::Instant::now();
    for handle in handles {
        assert!(!handle.await.unwrap().is_error());
    }
    // Serialised starts would need 500ms of virtual time.
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_read_only_commands_skip_session_lock() {
    let analyzer = MockAnalyzer::echo().with_delay(Duration::from_millis(300));
    let engine = Arc::new(engine_over(Arc::new(InMemorySessionStore::new()), analyzer));
    engine.handle_line("start; Basic login; s1").await;

    let refining = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.handle_line("refine; slow change; s1").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let history = tokio::time::timeout(
        Duration::from_millis(150),
        engine.handle_line("feedback_history; s1"),
    )
    .await
    .expect("read-only command waited on the session lock");
    assert_eq!(history.iteration, 1);

    let refined = refining.await.unwrap();
    assert_eq!(refined.iteration, 2);
}

#[tokio::test]
async fn test_stale_save_leaves_store_unchanged() {
    let store = InMemorySessionStore::new();
    let engine = engine_over(Arc::new(store.clone()), MockAnalyzer::echo());
    engine.handle_line("start; Basic login; s1").await;

    let mut first = store.load("s1").await.unwrap();
    let mut second = first.clone();
    let base = first.version;

    first.apply_edit("first writer").unwrap();
    store.save(&first, base).await.unwrap();

    second.apply_edit("second writer").unwrap();
    let err = store.save(&second, base).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::ConcurrentModification { expected, actual, .. }
            if expected == base && actual == first.version
    ));
    assert!(err.is_retryable());

    let stored = store.load("s1").await.unwrap();
    assert_eq!(stored.current_artifact, "first writer");
    assert_eq!(stored.version, first.version);
}
