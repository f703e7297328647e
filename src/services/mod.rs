//! Workflow services: parsing, session orchestration and feedback analytics.

pub mod command_parser;
pub mod insights;
pub mod pattern_classifier;
pub mod quality_analytics;
pub mod session_engine;
pub mod suggestion_engine;

pub use command_parser::parse_command;
pub use session_engine::SessionEngine;
pub use suggestion_engine::SuggestionEngine;
