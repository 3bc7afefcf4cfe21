//! `animap db` command - Inspect the SQLite mapping database
//!
//! All subcommands open the database read-only and print rows through the
//! shared renderer, so `--format` applies everywhere.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Value};

use crate::cli::helpers::{format_document, open_database};
use crate::cli::table::{cell_to_json, format_cell, indent, render_rows, rows_to_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{AnimeDatabase, Config, CrossReferenceRecord, RowSet, TitleMatch};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// List table names
    Tables,

    /// Show column definitions and sample rows for each table
    Schema {
        /// Only this table (default: every table)
        table: Option<String>,

        /// Sample rows per table (default: 5, or the `sample_rows` config key)
        #[arg(long, short = 'n')]
        rows: Option<usize>,
    },

    /// Search anime by MAL title
    Titles {
        /// Title text to search for
        pattern: String,

        /// How the pattern is matched
        #[arg(long = "match", short = 'm', value_enum, default_value_t = TitleMatch::Contains)]
        mode: TitleMatch,
    },

    /// Show values shared by several anime rows, with the rows sharing them
    Dupes {
        /// Column to group by
        #[arg(long, default_value = "imdb_id")]
        column: String,

        /// Maximum number of groups
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Execute SQL against the database (read-only)
    Query {
        /// SQL query to execute
        sql: String,
    },
}

pub fn run(cmd: DbCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = global.output_format(&config);
    let db = open_database(global, &config)?;

    match cmd {
        DbCommands::Tables => run_tables(&db, format),
        DbCommands::Schema { table, rows } => {
            let rows = rows.unwrap_or_else(|| config.sample_rows());
            run_schema(&db, table.as_deref(), rows, format, global.quiet)
        }
        DbCommands::Titles { pattern, mode } => {
            run_titles(&db, &pattern, mode, format, global.quiet)
        }
        DbCommands::Dupes { column, limit } => run_dupes(&db, &column, limit, format, global.quiet),
        DbCommands::Query { sql } => run_query(&db, &sql, format),
    }
}

fn run_tables(db: &AnimeDatabase, format: OutputFormat) -> Result<()> {
    let tables = db.tables()?;
    if format.is_structured() {
        println!("{}", format_document(&tables, format)?);
    } else {
        for table in tables {
            println!("{}", table);
        }
    }
    Ok(())
}

fn run_schema(
    db: &AnimeDatabase,
    only: Option<&str>,
    rows: usize,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let tables = match only {
        Some(table) => vec![table.to_string()],
        None => db.tables()?,
    };

    if format.is_structured() {
        let mut docs = Vec::with_capacity(tables.len());
        for table in &tables {
            let columns = db.columns(table)?;
            let sample = db.sample(table, rows)?;
            docs.push(json!({
                "table": table,
                "columns": rows_to_json(&RowSet::from(columns.as_slice())),
                "rows": rows_to_json(&sample),
            }));
        }
        println!("{}", format_document(&docs, format)?);
        return Ok(());
    }

    if !quiet {
        println!("{} {}", style("Tables:").bold(), tables.join(", "));
    }
    for table in &tables {
        let columns = db.columns(table)?;
        println!();
        println!("{}", style(format!("Schema for {}:", table)).bold());
        println!("{}", render_rows(&RowSet::from(columns.as_slice()), format)?);

        let sample = db.sample(table, rows)?;
        println!();
        println!("{}", style(format!("First {} rows of {}:", rows, table)).bold());
        println!("{}", render_rows(&sample, format)?);
    }
    Ok(())
}

fn run_titles(
    db: &AnimeDatabase,
    pattern: &str,
    mode: TitleMatch,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let records = db.search_titles(pattern, mode)?;

    if records.is_empty() && !format.is_structured() {
        if !quiet {
            println!("{} No titles matching '{}'", style("✗").yellow(), pattern);
        }
        return Ok(());
    }

    if !format.is_structured() && !quiet {
        println!("{} entries:", pattern);
    }
    println!("{}", render_rows(&RowSet::from(records.as_slice()), format)?);
    Ok(())
}

fn run_dupes(
    db: &AnimeDatabase,
    column: &str,
    limit: usize,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let groups = db.duplicate_groups(column, limit)?;

    if format.is_structured() {
        let mut docs = Vec::with_capacity(groups.len());
        for group in &groups {
            let records = db.records_where(column, &group.value)?;
            docs.push(json!({
                "value": cell_to_json(&group.value),
                "count": group.count,
                "records": records_json(&records)?,
            }));
        }
        println!("{}", format_document(&docs, format)?);
        return Ok(());
    }

    if groups.is_empty() {
        if !quiet {
            println!("{} No duplicate {} values", style("✓").green(), column);
        }
        return Ok(());
    }

    if !quiet {
        println!("Duplicate {} values:", column);
    }
    for group in &groups {
        println!(
            "{} ({} rows)",
            style(format_cell(&group.value)).cyan(),
            group.count
        );
        let records = db.records_where(column, &group.value)?;
        let rendered = render_rows(&RowSet::from(records.as_slice()), format)?;
        println!("{}", indent(&rendered, 2));
    }
    Ok(())
}

fn run_query(db: &AnimeDatabase, sql: &str, format: OutputFormat) -> Result<()> {
    let rows = db.query(sql)?;
    println!("{}", render_rows(&rows, format)?);
    Ok(())
}

fn records_json(records: &[CrossReferenceRecord]) -> Result<Value> {
    serde_json::to_value(records).into_diagnostic()
}
