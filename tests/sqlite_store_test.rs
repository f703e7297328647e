//! The review workflow running on the SQLite store.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use decider::adapters::collaborators::{MockAnalyzer, TemplateAnalyzer, TemplateTestGenerator};
use decider::adapters::sqlite::{
    create_migrated_test_pool, database_url, initialize_database, PoolConfig, SqliteSessionStore,
};
use decider::domain::models::{FeedbackKind, Session, SessionStatus, TestKind, WorkflowConfig};
use decider::domain::ports::SessionStore;
use decider::services::SessionEngine;

use common::{engine_over, setup_test_logging};

#[tokio::test]
async fn test_workflow_persists_through_sqlite() {
    setup_test_logging();
    let pool = create_migrated_test_pool().await.unwrap();
    let store = SqliteSessionStore::new(pool);
    let engine = engine_over(Arc::new(store.clone()), MockAnalyzer::echo());

    for line in [
        "start; Basic login; s1",
        "review; score:4; feedback:Missing password policies; s1",
        "enhance; PCI DSS scope; s1",
        "refine; Add password complexity; s1",
        "review; score:8; feedback:Better; s1",
        "approved; ship it; s1",
    ] {
        let response = engine.handle_line(line).await;
        assert!(!response.is_error(), "{line}: {:?}", response.error);
    }

    let session = store.load("s1").await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.iteration, 3);
    assert_eq!(session.score_history, vec![4, 8]);
    assert_eq!(session.accumulated_context, vec!["PCI DSS scope"]);
    assert_eq!(session.count(FeedbackKind::Approval), 1);
    assert!(session.test_suite.is_some());

    let listed = store.list(Some(SessionStatus::Completed), 10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(store
        .list(Some(SessionStatus::AwaitingReview), 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_sessions_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir.path().join("decider.db").to_string_lossy());

    {
        let pool = initialize_database(&url, None).await.unwrap();
        let engine = SessionEngine::new(
            Arc::new(SqliteSessionStore::new(pool.clone())),
            Arc::new(TemplateAnalyzer::new()),
            Arc::new(TemplateTestGenerator::new()),
            WorkflowConfig::default(),
        );
        engine
            .handle_line("start; Users sign in with a password. Admins manage roles; s1")
            .await;
        engine.handle_line("review; score:6; feedback:ok; s1").await;
        pool.close().await;
    }

    let pool = initialize_database(&url, None).await.unwrap();
    let engine = SessionEngine::new(
        Arc::new(SqliteSessionStore::new(pool)),
        Arc::new(TemplateAnalyzer::new()),
        Arc::new(TemplateTestGenerator::new()),
        WorkflowConfig::default(),
    );

    let history = engine.handle_line("feedback_history; s1").await;
    assert_eq!(history.feedback_history.unwrap().len(), 1);

    let approved = engine.handle_line("approved; ; s1").await;
    let suite = approved.test_suite.unwrap();
    assert!(suite
        .test_cases
        .iter()
        .any(|case| case.kind == TestKind::Security));
    assert_eq!(suite.total_tests, suite.test_cases.len());
}

/// The row and the timeline of a loaded session must agree.
fn assert_consistent(session: &Session) {
    let advancing = session.count(FeedbackKind::Refine)
        + session.count(FeedbackKind::Enhance)
        + session.count(FeedbackKind::Edited);
    assert_eq!(
        session.score_history.len(),
        session.count(FeedbackKind::Review),
        "score history disagrees with timeline at version {}",
        session.version
    );
    assert_eq!(
        session.iteration as usize,
        1 + advancing,
        "iteration disagrees with timeline at version {}",
        session.version
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_loads_are_consistent_while_saving() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir.path().join("decider.db").to_string_lossy());
    let pool = initialize_database(
        &url,
        Some(PoolConfig {
            max_connections: 5,
            ..PoolConfig::default()
        }),
    )
    .await
    .unwrap();
    let store = SqliteSessionStore::new(pool);

    let mut session = Session::new("s1", "Basic login");
    session.begin_analysis().unwrap();
    session.complete_analysis("v1".to_string()).unwrap();
    store.save(&session, 0).await.unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = store.clone();
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            for i in 0..200u32 {
                let mut session = store.load("s1").await.unwrap();
                let expected = session.version;
                if i % 2 == 0 {
                    session.apply_review(u8::try_from(i % 10 + 1).unwrap(), "again").unwrap();
                } else {
                    session.apply_edit(&format!("draft {i}")).unwrap();
                }
                store.save(&session, expected).await.unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                let mut reads = 0usize;
                while !done.load(Ordering::SeqCst) {
                    assert_consistent(&store.load("s1").await.unwrap());
                    for listed in store.list(None, 10).await.unwrap() {
                        assert_consistent(&listed);
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    let last = store.load("s1").await.unwrap();
    assert_consistent(&last);
    assert_eq!(last.score_history.len(), 100);
    assert_eq!(last.iteration, 101);
}
