//! Infrastructure adapters for storage and collaborators.

pub mod collaborators;
pub mod memory;
pub mod sqlite;
