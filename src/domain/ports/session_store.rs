/// Session store port (trait) for dependency injection.
///
/// Defines the contract for session persistence that storage adapters must
/// implement. The engine depends on this trait, not on concrete implementations.
use crate::domain::errors::DomainResult;
use crate::domain::models::{Session, SessionStatus};
use async_trait::async_trait;

/// Store trait for session persistence with optimistic concurrency
///
/// Implementations must guarantee:
/// - `load` returns a consistent snapshot whose `version` field is the stored version
/// - `save` is atomic: either the whole session is written or nothing is
/// - a rejected `save` leaves the stored session untouched
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session snapshot
    ///
    /// # Errors
    /// Returns error if:
    /// - Session does not exist (`SessionNotFound`)
    /// - Storage backend fails
    async fn load(&self, session_id: &str) -> DomainResult<Session>;

    /// Persists `session` if the stored version equals `expected_version`
    ///
    /// `expected_version == 0` means the session must not exist yet. The session's
    /// own `version` field is written as the new version and returned.
    ///
    /// # Errors
    /// Returns error if:
    /// - The stored version differs (`ConcurrentModification`)
    /// - Storage backend fails
    async fn save(&self, session: &Session, expected_version: u64) -> DomainResult<u64>;

    /// Lists sessions, most recently updated first
    ///
    /// # Arguments
    /// - `status`: Optional status filter
    /// - `limit`: Maximum number of results
    async fn list(&self, status: Option<SessionStatus>, limit: usize) -> DomainResult<Vec<Session>>;
}
