//! Row rendering for query results
//!
//! Every command that prints rows goes through [`render_rows`], so the
//! `--format` flag behaves the same for schema samples, title searches,
//! duplicate groups and ad hoc queries.

use miette::{IntoDiagnostic, Result};
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::core::RowSet;

/// Render a cell for text output
pub fn format_cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

/// Convert a cell to a typed JSON value
pub fn cell_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(*i),
        SqlValue::Real(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Blob(_) => Value::String(format_cell(value)),
    }
}

/// Rows as an array of `{column: value}` objects, columns in select order
pub fn rows_to_json(set: &RowSet) -> Value {
    let rows = set
        .rows
        .iter()
        .map(|row| {
            let obj: Map<String, Value> = set
                .columns
                .iter()
                .zip(row)
                .map(|(col, cell)| (col.clone(), cell_to_json(cell)))
                .collect();
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

/// Render a row set in the requested format
pub fn render_rows(set: &RowSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Auto => Ok(render_table(set, false)),
        OutputFormat::Md => Ok(render_table(set, true)),
        OutputFormat::Tsv => Ok(render_tsv(set)),
        OutputFormat::Csv => render_csv(set),
        OutputFormat::Json => serde_json::to_string_pretty(&rows_to_json(set)).into_diagnostic(),
        OutputFormat::Yaml => serde_yml::to_string(&rows_to_json(set)).into_diagnostic(),
    }
}

fn render_table(set: &RowSet, markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(set.columns.iter().cloned());
    for row in &set.rows {
        builder.push_record(row.iter().map(format_cell));
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::psql());
    }
    table.to_string()
}

fn render_tsv(set: &RowSet) -> String {
    let mut out = set.columns.join("\t");
    for row in &set.rows {
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|cell| format_cell(cell).replace(['\t', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    out
}

fn render_csv(set: &RowSet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&set.columns).into_diagnostic()?;
    for row in &set.rows {
        writer
            .write_record(row.iter().map(format_cell))
            .into_diagnostic()?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| miette::miette!("Failed to flush CSV output: {}", e))?;
    let text = String::from_utf8(bytes).into_diagnostic()?;
    Ok(text.trim_end_matches('\n').to_string())
}

/// Indent every line of a rendered block
pub fn indent(block: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    block
        .lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}
