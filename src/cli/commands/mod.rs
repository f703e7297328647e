//! CLI command implementations and shared wiring.

pub mod repl;
pub mod run;
pub mod sessions;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::collaborators::{TemplateAnalyzer, TemplateTestGenerator};
use crate::adapters::memory::InMemorySessionStore;
use crate::adapters::sqlite::{database_url, initialize_database, PoolConfig, SqliteSessionStore};
use crate::domain::models::{Config, StoreBackend};
use crate::domain::ports::SessionStore;
use crate::services::SessionEngine;

/// Opens the configured session store.
pub async fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemorySessionStore::new())),
        StoreBackend::Sqlite => {
            let url = database_url(&config.store.path);
            let pool = initialize_database(&url, Some(PoolConfig::from(&config.store)))
                .await
                .with_context(|| format!("Failed to open session store at {}", config.store.path))?;
            Ok(Arc::new(SqliteSessionStore::new(pool)))
        }
    }
}

/// Engine wired to the configured store and the template collaborators.
pub async fn build_engine(config: &Config) -> Result<SessionEngine> {
    let store = open_store(config).await?;
    Ok(SessionEngine::new(
        store,
        Arc::new(TemplateAnalyzer::new()),
        Arc::new(TemplateTestGenerator::new()),
        config.workflow.clone(),
    ))
}
