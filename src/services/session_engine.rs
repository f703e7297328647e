/// Session engine: the review workflow state machine.
///
/// The engine loads a session, applies one command, calls the analyzer or test
/// generator when the transition needs it and persists the result with an
/// optimistic version check. Mutating commands on the same session are serialised
/// by a per-session async mutex. Read-only commands use a single snapshot load
/// and never wait on that mutex.
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{CollaboratorError, DomainError, DomainResult};
use crate::domain::models::{Command, CommandResponse, Session, Verb, WorkflowConfig};
use crate::domain::ports::{AnalysisRequest, Analyzer, SessionStore, TestGenerator};
use crate::services::command_parser::parse_command;
use crate::services::insights;
use crate::services::suggestion_engine::SuggestionEngine;

/// Registry of per-session mutexes.
///
/// Entries are held weakly: once no command holds or waits for a session's
/// mutex, its entry is dropped on the next acquisition.
#[derive(Default)]
struct SessionLocks {
    entries: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl SessionLocks {
    async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, weak| weak.strong_count() > 0);

            if let Some(lock) = entries.get(session_id).and_then(Weak::upgrade) {
                lock
            } else {
                let lock = Arc::new(Mutex::new(()));
                entries.insert(session_id.to_string(), Arc::downgrade(&lock));
                lock
            }
        };
        lock.lock_owned().await
    }

    async fn live_entries(&self) -> usize {
        self.entries
            .lock()
            .await
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Orchestrates review sessions on top of a [`SessionStore`] and the two
/// collaborator ports.
pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    analyzer: Arc<dyn Analyzer>,
    test_generator: Arc<dyn TestGenerator>,
    config: WorkflowConfig,
    suggestions: SuggestionEngine,
    locks: SessionLocks,
}

impl SessionEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        analyzer: Arc<dyn Analyzer>,
        test_generator: Arc<dyn TestGenerator>,
        config: WorkflowConfig,
    ) -> Self {
        let suggestions = SuggestionEngine::new(config.max_suggestions);
        Self {
            store,
            analyzer,
            test_generator,
            config,
            suggestions,
            locks: SessionLocks::default(),
        }
    }

    /// Parses and executes one command line.
    ///
    /// Never fails: parse and execution errors are folded into the response's
    /// `error` field.
    pub async fn handle_line(&self, line: &str) -> CommandResponse {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                debug!(error = %err, "Rejected command line");
                return CommandResponse::from_error(None, "", &DomainError::Parse(err));
            }
        };

        let verb = command.verb();
        let session_id = command.session_id().unwrap_or_default().to_string();

        match self.execute(command).await {
            Ok(response) => response,
            Err(err) => {
                let mut response = CommandResponse::from_error(Some(verb), session_id, &err);
                if let DomainError::InvalidTransition { status, .. } = err {
                    response.status = Some(status);
                    response.available_actions = status.available_actions();
                }
                response
            }
        }
    }

    /// Executes a parsed command.
    ///
    /// # Errors
    /// - `SessionNotFound` for any verb but `start` on an unknown session
    /// - `InvalidTransition` when the session status does not accept the verb
    /// - `Collaborator` when the analyzer or test generator fails or times out
    /// - `ConcurrentModification` when the stored version moved underneath
    #[instrument(skip(self, command), fields(verb = %command.verb(), session_id = ?command.session_id()), err)]
    pub async fn execute(&self, command: Command) -> DomainResult<CommandResponse> {
        match command {
            Command::Start {
                requirements,
                session_id,
            } => {
                let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
                self.start(session_id, requirements).await
            }
            Command::Refine {
                feedback,
                session_id,
            } => self.refine(&session_id, &feedback).await,
            Command::Enhance {
                context,
                session_id,
            } => self.enhance(&session_id, &context).await,
            Command::Edited {
                content,
                session_id,
            } => self.edited(&session_id, &content).await,
            Command::Review {
                score,
                feedback,
                session_id,
            } => self.review(&session_id, score, &feedback).await,
            Command::Approved { note, session_id } => self.approve(&session_id, &note).await,
            Command::Rejected { reason, session_id } => self.reject(&session_id, &reason).await,
            Command::FeedbackHistory { session_id } => self.feedback_history(&session_id).await,
            Command::SuggestImprovements { session_id } => {
                self.suggest_improvements(&session_id).await
            }
        }
    }

    /// Number of per-session mutexes currently referenced.
    pub async fn active_locks(&self) -> usize {
        self.locks.live_entries().await
    }

    async fn start(&self, session_id: String, requirements: String) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(&session_id).await;

        match self.store.load(&session_id).await {
            Ok(existing) => {
                warn!(session_id = %session_id, status = %existing.status, "Start on existing session");
                return Err(DomainError::InvalidTransition {
                    session_id,
                    status: existing.status,
                    verb: Verb::Start,
                });
            }
            Err(DomainError::SessionNotFound(_)) => {}
            Err(err) => return Err(err),
        }

        let mut session = Session::new(session_id, requirements);
        session.begin_analysis()?;

        let request = AnalysisRequest::initial(session.original_request.clone());
        let artifact = self
            .call_collaborator(self.analyzer.name(), self.analyzer.analyze(request))
            .await?;

        session.complete_analysis(artifact)?;
        self.store.save(&session, 0).await?;
        info!(session_id = %session.session_id, "Session started");

        Ok(CommandResponse::for_session(Verb::Start, &session)
            .with_artifact(session.current_artifact.clone()))
    }

    async fn refine(&self, session_id: &str, feedback: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Refine).await?;
        let expected = session.version;

        let request = AnalysisRequest {
            original_request: session.original_request.clone(),
            accumulated_context: session.accumulated_context.clone(),
            prior_artifact: Some(session.current_artifact.clone()),
            refine_text: Some(feedback.to_string()),
        };
        let artifact = self
            .call_collaborator(self.analyzer.name(), self.analyzer.analyze(request))
            .await?;

        session.apply_refinement(feedback, artifact)?;
        self.store.save(&session, expected).await?;
        info!(session_id, iteration = session.iteration, "Analysis refined");

        Ok(CommandResponse::for_session(Verb::Refine, &session)
            .with_artifact(session.current_artifact.clone()))
    }

    async fn enhance(&self, session_id: &str, context: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Enhance).await?;
        let expected = session.version;

        let mut accumulated_context = session.accumulated_context.clone();
        accumulated_context.push(context.to_string());
        let request = AnalysisRequest {
            original_request: session.original_request.clone(),
            accumulated_context,
            prior_artifact: Some(session.current_artifact.clone()),
            refine_text: None,
        };
        let artifact = self
            .call_collaborator(self.analyzer.name(), self.analyzer.analyze(request))
            .await?;

        session.apply_enhancement(context, artifact)?;
        self.store.save(&session, expected).await?;
        info!(session_id, iteration = session.iteration, "Context added");

        Ok(CommandResponse::for_session(Verb::Enhance, &session)
            .with_artifact(session.current_artifact.clone()))
    }

    async fn edited(&self, session_id: &str, content: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Edited).await?;
        let expected = session.version;

        session.apply_edit(content)?;
        self.store.save(&session, expected).await?;
        info!(session_id, iteration = session.iteration, "Artifact replaced by human edit");

        Ok(CommandResponse::for_session(Verb::Edited, &session)
            .with_artifact(session.current_artifact.clone()))
    }

    async fn review(&self, session_id: &str, score: u8, feedback: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Review).await?;
        let expected = session.version;

        session.apply_review(score, feedback)?;
        self.store.save(&session, expected).await?;
        info!(session_id, score, "Review recorded");

        let mut response = CommandResponse::for_session(Verb::Review, &session);
        response.score = Some(score);
        response.metrics = Some(insights::metrics(&session));
        if score < self.config.quality_threshold {
            response.suggestions = Some(self.suggestions.suggest_for(&session));
        }
        Ok(response)
    }

    async fn approve(&self, session_id: &str, note: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Approved).await?;
        let expected = session.version;

        let suite = self
            .call_collaborator(
                self.test_generator.name(),
                self.test_generator.generate(&session.current_artifact),
            )
            .await?;

        session.apply_approval(note, suite)?;
        self.store.save(&session, expected).await?;
        info!(
            session_id,
            total_tests = session.test_suite.as_ref().map_or(0, |s| s.total_tests),
            "Session approved"
        );

        let mut response = CommandResponse::for_session(Verb::Approved, &session)
            .with_artifact(session.current_artifact.clone());
        response.metrics = Some(insights::metrics(&session));
        response.test_suite = session.test_suite;
        Ok(response)
    }

    async fn reject(&self, session_id: &str, reason: &str) -> DomainResult<CommandResponse> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_accepting(session_id, Verb::Rejected).await?;
        let expected = session.version;

        session.apply_rejection(reason)?;
        self.store.save(&session, expected).await?;
        info!(session_id, "Session rejected");

        Ok(CommandResponse::for_session(Verb::Rejected, &session))
    }

    async fn feedback_history(&self, session_id: &str) -> DomainResult<CommandResponse> {
        let session = self.store.load(session_id).await?;

        let mut response = CommandResponse::for_session(Verb::FeedbackHistory, &session);
        response.metrics = Some(insights::metrics(&session));
        response.insights = Some(insights::insights(&session));
        response.feedback_history = Some(session.feedback_history);
        Ok(response)
    }

    async fn suggest_improvements(&self, session_id: &str) -> DomainResult<CommandResponse> {
        let session = self.store.load(session_id).await?;

        let mut response = CommandResponse::for_session(Verb::SuggestImprovements, &session);
        response.suggestions = Some(self.suggestions.suggest_for(&session));
        response.insights = Some(insights::insights(&session));
        Ok(response)
    }

    /// Loads a session and checks its status accepts `verb`.
    async fn load_accepting(&self, session_id: &str, verb: Verb) -> DomainResult<Session> {
        let session = self.store.load(session_id).await?;
        if let Err(err) = session.ensure_accepts(verb) {
            warn!(session_id, status = %session.status, verb = %verb, "Rejected transition");
            return Err(err);
        }
        Ok(session)
    }

    /// Awaits a collaborator call bounded by the configured timeout.
    async fn call_collaborator<T, F>(&self, name: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = Result<T, CollaboratorError>>,
    {
        let timeout = self.config.collaborator_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(collaborator = name, error = %err, "Collaborator failed");
                Err(err.into())
            }
            Err(_) => {
                warn!(collaborator = name, timeout_secs = timeout.as_secs(), "Collaborator timed out");
                Err(CollaboratorError::TimedOut {
                    collaborator: name,
                    timeout,
                }
                .into())
            }
        }
    }
}
