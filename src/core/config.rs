//! Configuration management with layered hierarchy
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. global user config (`<config dir>/animap/config.yaml`)
//! 3. local `.animap.yaml` in the working directory
//! 4. CLI flags and their environment variables (applied by the caller)

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::database::DEFAULT_SAMPLE_ROWS;

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".animap.yaml";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("no mapping file configured")]
    #[diagnostic(
        code(animap::config::mappings),
        help("pass --mappings <PATH>, set ANIMAP_MAPPINGS, or add `mappings: <PATH>` to .animap.yaml")
    )]
    MissingMappings,

    #[error("no database configured")]
    #[diagnostic(
        code(animap::config::database),
        help("pass --db <PATH>, set ANIMAP_DATABASE, or add `database: <PATH>` to .animap.yaml")
    )]
    MissingDatabase,
}

/// animap configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path to the JSON mapping file
    pub mappings: Option<PathBuf>,

    /// Path to the SQLite mapping database
    pub database: Option<PathBuf>,

    /// Rows shown per table by `db schema`
    pub sample_rows: Option<usize>,

    /// Default output format
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from the global and local files
    pub fn load() -> Self {
        let local = std::env::current_dir()
            .ok()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE));
        Self::load_from(Self::global_config_path().as_deref(), local.as_deref())
    }

    /// Load from explicit file locations, later files take precedence
    ///
    /// Missing files are skipped; unreadable or malformed files are skipped
    /// with a warning.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Self {
        let mut config = Config::default();
        for path in [global, local].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }
        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "animap")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.mappings.is_some() {
            self.mappings = other.mappings;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.sample_rows.is_some() {
            self.sample_rows = other.sample_rows;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
    }

    /// Resolve the mapping file, preferring an explicit override
    pub fn mappings_path(&self, cli: Option<&Path>) -> Result<PathBuf, ConfigError> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.mappings.clone())
            .ok_or(ConfigError::MissingMappings)
    }

    /// Resolve the database file, preferring an explicit override
    pub fn database_path(&self, cli: Option<&Path>) -> Result<PathBuf, ConfigError> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .ok_or(ConfigError::MissingDatabase)
    }

    /// Number of sample rows for schema introspection
    pub fn sample_rows(&self) -> usize {
        self.sample_rows.unwrap_or(DEFAULT_SAMPLE_ROWS)
    }
}
