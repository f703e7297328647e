use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, StoreBackend};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid quality_threshold: {0}. Must be between 1 and 10")]
    InvalidQualityThreshold(u8),

    #[error("Invalid collaborator_timeout_secs: {0}. Must be at least 1")]
    InvalidCollaboratorTimeout(u64),

    #[error("Invalid max_suggestions: {0}. Must be at least 1")]
    InvalidMaxSuggestions(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

const CONFIG_DIR: &str = ".decider";
const ENV_PREFIX: &str = "DECIDER_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the working directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .decider/config.yaml (project config)
    /// 3. .decider/local.yaml (local overrides, optional)
    /// 4. Environment variables (DECIDER_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`] with `.decider/` resolved under `root`
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment variables still override it
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let workflow = &config.workflow;
        if !(1..=10).contains(&workflow.quality_threshold) {
            return Err(ConfigError::InvalidQualityThreshold(workflow.quality_threshold));
        }
        if workflow.collaborator_timeout_secs == 0 {
            return Err(ConfigError::InvalidCollaboratorTimeout(
                workflow.collaborator_timeout_secs,
            ));
        }
        if workflow.max_suggestions == 0 {
            return Err(ConfigError::InvalidMaxSuggestions(workflow.max_suggestions));
        }

        if config.store.backend == StoreBackend::Sqlite && config.store.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.store.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.store.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workflow.quality_threshold, 7);
        assert_eq!(config.workflow.collaborator_timeout_secs, 120);
        assert_eq!(config.workflow.max_suggestions, 3);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.path, ".decider/decider.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.rotation, "never");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
workflow:
  quality_threshold: 6
  max_suggestions: 5
store:
  backend: sqlite
  path: /custom/path.db
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.workflow.quality_threshold, 6);
        assert_eq!(config.workflow.max_suggestions, 5);
        assert_eq!(config.workflow.collaborator_timeout_secs, 120);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.path, "/custom/path.db");
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.logging.format, "json");
        assert!(config.logging.log_dir.is_none());

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_quality_threshold() {
        let mut config = Config::default();
        config.workflow.quality_threshold = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidQualityThreshold(0))
        ));

        config.workflow.quality_threshold = 11;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidQualityThreshold(11))
        ));
    }

    #[test]
    fn test_validate_zero_timeout_and_suggestions() {
        let mut config = Config::default();
        config.workflow.collaborator_timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCollaboratorTimeout(0))
        ));

        let mut config = Config::default();
        config.workflow.max_suggestions = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxSuggestions(0))
        ));
    }

    #[test]
    fn test_validate_store() {
        let mut config = Config::default();
        config.store.path = String::new();
        // Path only matters for the sqlite backend
        assert!(ConfigLoader::validate(&config).is_ok());

        config.store.backend = StoreBackend::Sqlite;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.store.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();

        let mut base = std::fs::File::create(dir.join("config.yaml")).unwrap();
        writeln!(
            base,
            "workflow:\n  quality_threshold: 5\n  max_suggestions: 2\nlogging:\n  format: json"
        )
        .unwrap();

        let mut local = std::fs::File::create(dir.join("local.yaml")).unwrap();
        writeln!(local, "workflow:\n  quality_threshold: 8").unwrap();

        temp_env::with_vars(
            [
                ("DECIDER_WORKFLOW__MAX_SUGGESTIONS", Some("4")),
                ("DECIDER_STORE__BACKEND", Some("sqlite")),
            ],
            || {
                let config = ConfigLoader::load_from_dir(root.path()).unwrap();
                assert_eq!(config.workflow.quality_threshold, 8, "local.yaml should win");
                assert_eq!(config.workflow.max_suggestions, 4, "env should win");
                assert_eq!(config.store.backend, StoreBackend::Sqlite);
                assert_eq!(config.logging.format, "json");
                assert_eq!(config.workflow.collaborator_timeout_secs, 120);
            },
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workflow:\n  collaborator_timeout_secs: 30").unwrap();
        file.flush().unwrap();

        temp_env::with_vars_unset(["DECIDER_WORKFLOW__COLLABORATOR_TIMEOUT_SECS"], || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.workflow.collaborator_timeout_secs, 30);
        });

        assert!(ConfigLoader::load_from_file("/nonexistent/decider.yaml").is_err());
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let root = tempfile::tempdir().unwrap();
        temp_env::with_var("DECIDER_WORKFLOW__QUALITY_THRESHOLD", Some("42"), || {
            let err = ConfigLoader::load_from_dir(root.path()).unwrap_err();
            assert!(err.to_string().contains("quality_threshold"));
        });
    }
}
