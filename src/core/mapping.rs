//! JSON mapping file: loading, identifier lookup and duplicate detection
//!
//! The mapping is a single JSON object of `key -> record`. Records are kept
//! in document order because lookups are "first match wins".

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::identifier::{contains, identifiers, Identifier};

/// Errors raised while loading a mapping file
#[derive(Debug, Error, Diagnostic)]
pub enum MappingError {
    #[error("failed to read mapping file {path}")]
    #[diagnostic(
        code(animap::mapping::io),
        help("check the --mappings flag, ANIMAP_MAPPINGS or the `mappings` config key")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("mapping file {path} must contain a JSON object at the top level, found {found}")]
    #[diagnostic(code(animap::mapping::shape))]
    NotAnObject { path: String, found: &'static str },
}

/// JSON syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("JSON syntax error: {message}")]
#[diagnostic(code(animap::mapping::syntax))]
pub struct JsonSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,
}

impl JsonSyntaxError {
    fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let offset = line_col_to_offset(source, err.line(), err.column());
        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            message: err.to_string(),
        }
    }
}

/// Convert a 1-based line/column pair to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum::<usize>();
    let line_text = source[line_start..].lines().next().unwrap_or("");
    let col_offset = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());
    (line_start + col_offset).min(source.len())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A parsed mapping document
#[derive(Debug, Clone, Default)]
pub struct MappingFile {
    entries: Map<String, Value>,
}

/// A record that matched a lookup
pub type Entry<'a> = (&'a str, &'a Value);

impl MappingFile {
    /// Load and parse a mapping file from disk
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let name = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: name.clone(),
            source,
        })?;
        let mapping = Self::from_json_str(&source, &name)?;
        tracing::debug!(path = %name, entries = mapping.len(), "loaded mapping file");
        Ok(mapping)
    }

    /// Parse a mapping document, `name` is used in diagnostics
    pub fn from_json_str(source: &str, name: &str) -> Result<Self, MappingError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| JsonSyntaxError::from_serde_error(&e, source, name))?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(MappingError::NotAnObject {
                path: name.to_string(),
                found: json_type_name(&other),
            }),
        }
    }

    /// Number of records in the mapping
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over records in document order
    pub fn iter(&self) -> impl Iterator<Item = Entry<'_>> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find the first record (in document order) whose `field` holds `target`
    pub fn find_first(&self, field: &str, target: &Identifier) -> Option<Entry<'_>> {
        self.iter().find(|(_, record)| holds(record, field, target))
    }

    /// Find every record whose `field` holds `target`
    pub fn find_all(&self, field: &str, target: &Identifier) -> Vec<Entry<'_>> {
        self.iter()
            .filter(|(_, record)| holds(record, field, target))
            .collect()
    }

    /// Count unique and repeated identifier values of `field`
    ///
    /// The first record holding a value owns it; every later occurrence,
    /// including a repeat inside the same record, counts as a duplicate.
    pub fn duplicates(&self, field: &str) -> DuplicateReport {
        let mut report = DuplicateReport {
            field: field.to_string(),
            total_records: self.len(),
            ..DuplicateReport::default()
        };

        for (key, record) in self.iter() {
            let ids = record.get(field).map(identifiers).unwrap_or_default();
            if ids.is_empty() {
                continue;
            }
            report.records_with_values += 1;

            for id in ids {
                report.values_processed += 1;
                match report.first_seen.get(&id) {
                    Some(first_key) => report.repeats.push(Duplicate {
                        first_key: first_key.clone(),
                        key: key.to_string(),
                        value: id,
                    }),
                    None => {
                        report.first_seen.insert(id, key.to_string());
                    }
                }
            }
        }

        tracing::debug!(
            field,
            unique = report.unique_values(),
            duplicates = report.duplicate_count(),
            "duplicate scan finished"
        );
        report
    }
}

fn holds(record: &Value, field: &str, target: &Identifier) -> bool {
    record.get(field).is_some_and(|value| contains(value, target))
}

/// One repeated identifier occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duplicate {
    pub value: Identifier,
    pub first_key: String,
    pub key: String,
}

/// Result of a duplicate scan over one field
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    pub field: String,
    pub total_records: usize,
    /// Records whose field held at least one identifier
    pub records_with_values: usize,
    /// Non-absent identifier values seen across all records
    pub values_processed: usize,
    /// Value -> key of the record that first held it
    pub first_seen: HashMap<Identifier, String>,
    /// Every occurrence after the first, in scan order
    pub repeats: Vec<Duplicate>,
}

impl DuplicateReport {
    pub fn unique_values(&self) -> usize {
        self.first_seen.len()
    }

    pub fn duplicate_count(&self) -> usize {
        self.repeats.len()
    }

    /// Serializable summary without the first-seen table
    pub fn summary(&self) -> DuplicateSummary<'_> {
        DuplicateSummary {
            field: &self.field,
            total_records: self.total_records,
            records_with_values: self.records_with_values,
            values_processed: self.values_processed,
            unique_values: self.unique_values(),
            duplicates: self.duplicate_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DuplicateSummary<'a> {
    pub field: &'a str,
    pub total_records: usize,
    pub records_with_values: usize,
    pub values_processed: usize,
    pub unique_values: usize,
    pub duplicates: usize,
}
