//! Domain layer for the decider review workflow
//!
//! This module contains the session model, its transition rules and the port
//! traits that collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CollaboratorError, DomainError, DomainResult, ParseError};
