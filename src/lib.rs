//! Decider - human-in-the-loop review of requirements analyses
//!
//! A session starts from a natural-language request, receives an analysis from
//! an [`Analyzer`](domain::ports::Analyzer) and is then driven by reviewer
//! commands (`refine`, `enhance`, `review`, `edited`, ...) until it is approved,
//! which produces a test suite, or rejected.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): session model, transition rules and ports
//! - **Service Layer** (`services`): command parsing, the session engine and feedback analytics
//! - **Adapters** (`adapters`): in-memory and SQLite stores, template and mock collaborators
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use decider::adapters::collaborators::{TemplateAnalyzer, TemplateTestGenerator};
//! use decider::adapters::memory::InMemorySessionStore;
//! use decider::services::SessionEngine;
//!
//! let engine = SessionEngine::new(
//!     Arc::new(InMemorySessionStore::new()),
//!     Arc::new(TemplateAnalyzer::new()),
//!     Arc::new(TemplateTestGenerator::new()),
//!     Default::default(),
//! );
//! let response = engine.handle_line("start; Basic login; s1").await;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{CollaboratorError, DomainError, DomainResult, ParseError};
pub use domain::models::{Command, CommandResponse, Config, Session, SessionStatus, Verb};
pub use domain::ports::{Analyzer, SessionStore, TestGenerator};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::SessionEngine;
