//! In-memory session store with the same version semantics as the SQLite store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Session, SessionStatus};
use crate::domain::ports::SessionStore;

/// Session store backed by a `HashMap`; contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> DomainResult<Session> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))
    }

    async fn save(&self, session: &Session, expected_version: u64) -> DomainResult<u64> {
        let mut sessions = self.sessions.write().await;

        let actual = sessions.get(&session.session_id).map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrentModification {
                session_id: session.session_id.clone(),
                expected: expected_version,
                actual,
            });
        }

        sessions.insert(session.session_id.clone(), session.clone());
        Ok(session.version)
    }

    async fn list(&self, status: Option<SessionStatus>, limit: usize) -> DomainResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<Session> = sessions
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> Session {
        let mut session = Session::new(id, "Basic login");
        session.begin_analysis().unwrap();
        session.complete_analysis("v1".to_string()).unwrap();
        session
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = InMemorySessionStore::new();
        let session = started("s1");
        assert_eq!(store.save(&session, 0).await.unwrap(), 1);

        let loaded = store.load("s1").await.unwrap();
        assert_eq!(loaded, session);
        assert!(matches!(
            store.load("s2").await,
            Err(DomainError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let store = InMemorySessionStore::new();
        let session = started("s1");
        store.save(&session, 0).await.unwrap();

        let err = store.save(&started("s1"), 0).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ConcurrentModification {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_save_leaves_store_untouched() {
        let store = InMemorySessionStore::new();
        let session = started("s1");
        store.save(&session, 0).await.unwrap();

        let mut first = store.load("s1").await.unwrap();
        let mut second = store.load("s1").await.unwrap();

        first.apply_review(8, "good").unwrap();
        store.save(&first, 1).await.unwrap();

        second.apply_edit("overwrite").unwrap();
        assert!(store.save(&second, 1).await.is_err());

        let stored = store.load("s1").await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.current_artifact, "v1");
        assert_eq!(stored.score_history, vec![8]);
    }

    #[tokio::test]
    async fn test_list_filters_and_limits() {
        let store = InMemorySessionStore::new();
        for id in ["a", "b", "c"] {
            store.save(&started(id), 0).await.unwrap();
        }
        let mut rejected = store.load("b").await.unwrap();
        rejected.apply_rejection("no").unwrap();
        store.save(&rejected, 1).await.unwrap();

        let all = store.list(None, 10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].session_id, "b");

        let only_rejected = store.list(Some(SessionStatus::Rejected), 10).await.unwrap();
        assert_eq!(only_rejected.len(), 1);
        assert_eq!(store.list(None, 2).await.unwrap().len(), 2);
    }
}
