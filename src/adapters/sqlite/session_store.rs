//! SQLite implementation of the SessionStore.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{FeedbackEvent, FeedbackKind, Session, SessionStatus, TestSuite};
use crate::domain::ports::SessionStore;

use super::{parse_datetime, parse_json_or_default, to_i64, to_u64};

const SESSION_COLUMNS: &str = "session_id, status, iteration, original_request, current_artifact, \
     accumulated_context, score_history, rejection_reason, test_suite, version, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reads run inside one transaction so the session row and its events come
    /// from the same database snapshot.
    async fn load_events(tx: &mut Transaction<'_, Sqlite>, session_id: &str) -> DomainResult<Vec<FeedbackEvent>> {
        let rows: Vec<FeedbackEventRow> = sqlx::query_as(
            "SELECT sequence, iteration, kind, text, score, timestamp FROM feedback_events
             WHERE session_id = ? ORDER BY sequence",
        )
        .bind(session_id)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn stored_version(tx: &mut Transaction<'_, Sqlite>, session_id: &str) -> DomainResult<u64> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&mut **tx)
            .await?;
        row.map_or(Ok(0), |(version,)| to_u64(version))
    }

    /// Inserts events not yet stored. Existing rows are never rewritten.
    async fn append_events(tx: &mut Transaction<'_, Sqlite>, session: &Session) -> DomainResult<usize> {
        let (next,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(sequence) + 1, 0) FROM feedback_events WHERE session_id = ?")
                .bind(&session.session_id)
                .fetch_one(&mut **tx)
                .await?;
        let next = to_u64(next)?;

        let mut appended = 0;
        for event in session.feedback_history.iter().filter(|e| e.sequence >= next) {
            sqlx::query(
                "INSERT INTO feedback_events (session_id, sequence, iteration, kind, text, score, timestamp)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&session.session_id)
            .bind(to_i64(event.sequence)?)
            .bind(i64::from(event.iteration))
            .bind(event.kind.as_str())
            .bind(&event.text)
            .bind(event.score.map(i64::from))
            .bind(event.timestamp.to_rfc3339())
            .execute(&mut **tx)
            .await?;
            appended += 1;
        }
        Ok(appended)
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, session_id: &str) -> DomainResult<Session> {
        let mut tx = self.pool.begin().await?;

        let row: Option<SessionRow> =
            sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?"))
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;

        let row = row.ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;
        let events = Self::load_events(&mut tx, session_id).await?;
        tx.commit().await?;
        row.into_session(events)
    }

    async fn save(&self, session: &Session, expected_version: u64) -> DomainResult<u64> {
        let accumulated_context = serde_json::to_string(&session.accumulated_context)?;
        let score_history = serde_json::to_string(&session.score_history)?;
        let test_suite = session
            .test_suite
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        let result = if expected_version == 0 {
            sqlx::query(&format!(
                "INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (session_id) DO NOTHING"
            ))
            .bind(&session.session_id)
            .bind(session.status.as_str())
            .bind(i64::from(session.iteration))
            .bind(&session.original_request)
            .bind(&session.current_artifact)
            .bind(&accumulated_context)
            .bind(&score_history)
            .bind(&session.rejection_reason)
            .bind(&test_suite)
            .bind(to_i64(session.version)?)
            .bind(session.created_at.to_rfc3339())
            .bind(session.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?
        } else {
            sqlx::query(
                "UPDATE sessions SET status = ?, iteration = ?, current_artifact = ?,
                 accumulated_context = ?, score_history = ?, rejection_reason = ?, test_suite = ?,
                 version = ?, updated_at = ?
                 WHERE session_id = ? AND version = ?",
            )
            .bind(session.status.as_str())
            .bind(i64::from(session.iteration))
            .bind(&session.current_artifact)
            .bind(&accumulated_context)
            .bind(&score_history)
            .bind(&session.rejection_reason)
            .bind(&test_suite)
            .bind(to_i64(session.version)?)
            .bind(session.updated_at.to_rfc3339())
            .bind(&session.session_id)
            .bind(to_i64(expected_version)?)
            .execute(&mut *tx)
            .await?
        };

        if result.rows_affected() == 0 {
            let actual = Self::stored_version(&mut tx, &session.session_id).await?;
            return Err(DomainError::ConcurrentModification {
                session_id: session.session_id.clone(),
                expected: expected_version,
                actual,
            });
        }

        let appended = Self::append_events(&mut tx, session).await?;
        tx.commit().await?;

        tracing::debug!(
            session_id = %session.session_id,
            version = session.version,
            appended,
            "Session saved"
        );
        Ok(session.version)
    }

    async fn list(&self, status: Option<SessionStatus>, limit: usize) -> DomainResult<Vec<Session>> {
        let mut query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE 1=1");
        if status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY updated_at DESC LIMIT ?");

        let mut q = sqlx::query_as::<_, SessionRow>(&query);
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }
        let mut tx = self.pool.begin().await?;
        let rows: Vec<SessionRow> = q
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&mut *tx)
            .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let events = Self::load_events(&mut tx, &row.session_id).await?;
            sessions.push(row.into_session(events)?);
        }
        tx.commit().await?;
        Ok(sessions)
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    status: String,
    iteration: i64,
    original_request: String,
    current_artifact: String,
    accumulated_context: Option<String>,
    score_history: Option<String>,
    rejection_reason: Option<String>,
    test_suite: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn into_session(self, feedback_history: Vec<FeedbackEvent>) -> DomainResult<Session> {
        let status = SessionStatus::parse(&self.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", self.status)))?;

        let iteration = u32::try_from(self.iteration)
            .map_err(|e| DomainError::Serialization(format!("Invalid iteration: {e}")))?;

        let test_suite: Option<TestSuite> = self
            .test_suite
            .map(|s| serde_json::from_str(&s))
            .transpose()?;

        Ok(Session {
            session_id: self.session_id,
            status,
            iteration,
            original_request: self.original_request,
            current_artifact: self.current_artifact,
            accumulated_context: parse_json_or_default(self.accumulated_context)?,
            score_history: parse_json_or_default(self.score_history)?,
            feedback_history,
            rejection_reason: self.rejection_reason,
            test_suite,
            version: to_u64(self.version)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackEventRow {
    sequence: i64,
    iteration: i64,
    kind: String,
    text: String,
    score: Option<i64>,
    timestamp: String,
}

impl TryFrom<FeedbackEventRow> for FeedbackEvent {
    type Error = DomainError;

    fn try_from(row: FeedbackEventRow) -> Result<Self, Self::Error> {
        let kind = FeedbackKind::parse(&row.kind)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid feedback kind: {}", row.kind)))?;

        let iteration = u32::try_from(row.iteration)
            .map_err(|e| DomainError::Serialization(format!("Invalid iteration: {e}")))?;

        let score = row
            .score
            .map(u8::try_from)
            .transpose()
            .map_err(|e| DomainError::Serialization(format!("Invalid score: {e}")))?;

        Ok(Self {
            sequence: to_u64(row.sequence)?,
            iteration,
            kind,
            text: row.text,
            score,
            timestamp: parse_datetime(&row.timestamp)?,
        })
    }
}
