//! Shared helper functions for CLI commands
//!
//! Opening data sources and printing single documents is the same for every
//! command, so it lives here.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::mapping::Entry;
use crate::core::{AnimeDatabase, Config, MappingFile};

/// Load the mapping file named by the flags or the config
pub fn open_mappings(global: &GlobalOpts, config: &Config) -> Result<MappingFile> {
    let path = config.mappings_path(global.mappings.as_deref())?;
    Ok(MappingFile::load(&path)?)
}

/// Open the database named by the flags or the config
pub fn open_database(global: &GlobalOpts, config: &Config) -> Result<AnimeDatabase> {
    let path = config.database_path(global.database.as_deref())?;
    AnimeDatabase::open(&path)
}

/// Serialize a document as YAML or as indented JSON
pub fn format_document<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(value).into_diagnostic(),
        _ => serde_json::to_string_pretty(value).into_diagnostic(),
    }
}

/// Build the `{key: record}` object printed for lookup results
pub fn entries_document(entries: &[Entry<'_>]) -> Value {
    let obj: Map<String, Value> = entries
        .iter()
        .map(|(key, record)| (key.to_string(), (*record).clone()))
        .collect();
    Value::Object(obj)
}
