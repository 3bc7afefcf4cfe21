//! Read-only access to the SQLite anime mapping database
//!
//! The connection is opened with `SQLITE_OPEN_READ_ONLY`, so a missing file
//! is an error rather than a freshly created empty database, and any write
//! statement passed to [`AnimeDatabase::query`] is rejected by SQLite.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use miette::{Diagnostic, IntoDiagnostic, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Batch, Connection, OpenFlags, Statement};
use thiserror::Error;

use crate::core::record::CrossReferenceRecord;

/// Table holding the cross-reference rows
pub const ANIME_TABLE: &str = "anime";

/// Default number of sample rows shown per table
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("database file not found: {}", .0.display())]
    #[diagnostic(
        code(animap::db::not_found),
        help("check the --db flag, ANIMAP_DATABASE or the `database` config key")
    )]
    NotFound(PathBuf),

    #[error("no such table: {0}")]
    #[diagnostic(code(animap::db::table), help("run `animap db tables` to list tables"))]
    UnknownTable(String),

    #[error("no such column on {table}: {column}")]
    #[diagnostic(code(animap::db::column), help("available columns: {available}"))]
    UnknownColumn {
        table: String,
        column: String,
        available: String,
    },

    #[error("no SQL statement to run")]
    #[diagnostic(code(animap::db::empty_query))]
    EmptyQuery,

    #[error("only one SQL statement can be run at a time")]
    #[diagnostic(
        code(animap::db::multiple_statements),
        help("remove everything after the first `;`")
    )]
    MultipleStatements,
}

/// Column definition as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it
    pub pk: i64,
}

impl ColumnInfo {
    pub const HEADERS: [&'static str; 6] = ["cid", "name", "type", "notnull", "dflt_value", "pk"];

    pub fn to_cells(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(self.cid),
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.decl_type.clone()),
            SqlValue::Integer(self.not_null as i64),
            self.default_value
                .clone()
                .map(SqlValue::Text)
                .unwrap_or(SqlValue::Null),
            SqlValue::Integer(self.pk),
        ]
    }
}

/// Column names plus raw rows of a query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl From<&[CrossReferenceRecord]> for RowSet {
    fn from(records: &[CrossReferenceRecord]) -> Self {
        Self {
            columns: CrossReferenceRecord::COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: records.iter().map(CrossReferenceRecord::to_cells).collect(),
        }
    }
}

impl From<&[ColumnInfo]> for RowSet {
    fn from(columns: &[ColumnInfo]) -> Self {
        Self {
            columns: ColumnInfo::HEADERS.iter().map(|c| c.to_string()).collect(),
            rows: columns.iter().map(ColumnInfo::to_cells).collect(),
        }
    }
}

/// How a title pattern is matched against `mal_title`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TitleMatch {
    /// Title contains the pattern (`LIKE '%pattern%'`)
    #[default]
    Contains,
    /// Title starts with the pattern (`LIKE 'pattern%'`)
    Prefix,
    /// Title equals the pattern
    Exact,
}

/// A value shared by more than one row
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub value: SqlValue,
    pub count: i64,
}

/// Read-only handle on the anime mapping database
pub struct AnimeDatabase {
    conn: Connection,
}

impl AnimeDatabase {
    /// Open an existing database read-only
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DatabaseError::NotFound(path.to_path_buf()).into());
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .into_diagnostic()?;
        tracing::debug!(path = %path.display(), "opened database read-only");

        Ok(Self { conn })
    }

    /// Names of all tables, in `sqlite_master` order
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .into_diagnostic()?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .into_diagnostic()?
            .collect::<std::result::Result<Vec<String>, _>>()
            .into_diagnostic()?;
        Ok(names)
    }

    /// Column definitions of a table
    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
            )
            .into_diagnostic()?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    decl_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    pk: row.get(5)?,
                })
            })
            .into_diagnostic()?
            .collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()?;

        if columns.is_empty() {
            return Err(DatabaseError::UnknownTable(table.to_string()).into());
        }
        Ok(columns)
    }

    /// First `limit` rows of a table, verbatim
    pub fn sample(&self, table: &str, limit: usize) -> Result<RowSet> {
        self.ensure_table(table)?;
        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_ident(table));
        self.run(&sql, params![limit as i64])
    }

    /// Search `mal_title` in the anime table
    pub fn search_titles(
        &self,
        pattern: &str,
        mode: TitleMatch,
    ) -> Result<Vec<CrossReferenceRecord>> {
        let (condition, bound) = match mode {
            TitleMatch::Contains => ("mal_title LIKE ?1", format!("%{}%", pattern)),
            TitleMatch::Prefix => ("mal_title LIKE ?1", format!("{}%", pattern)),
            TitleMatch::Exact => ("mal_title = ?1", pattern.to_string()),
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            CrossReferenceRecord::select_list(),
            ANIME_TABLE,
            condition
        );
        tracing::debug!(%sql, pattern = %bound, "searching titles");
        self.records(&sql, SqlValue::Text(bound))
    }

    /// Values of `column` shared by more than one row, most frequent first
    pub fn duplicate_groups(&self, column: &str, limit: usize) -> Result<Vec<DuplicateGroup>> {
        self.ensure_column(ANIME_TABLE, column)?;
        let col = quote_ident(column);
        let sql = format!(
            "SELECT {col}, COUNT(*) AS c FROM {table} WHERE {col} IS NOT NULL \
             GROUP BY {col} HAVING c > 1 ORDER BY c DESC, {col} LIMIT ?1",
            col = col,
            table = ANIME_TABLE,
        );
        let mut stmt = self.conn.prepare(&sql).into_diagnostic()?;
        let groups = stmt
            .query_map(params![limit as i64], |row| {
                Ok(DuplicateGroup {
                    value: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .into_diagnostic()?
            .collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()?;
        Ok(groups)
    }

    /// Rows whose `column` equals `value`
    pub fn records_where(
        &self,
        column: &str,
        value: &SqlValue,
    ) -> Result<Vec<CrossReferenceRecord>> {
        self.ensure_column(ANIME_TABLE, column)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            CrossReferenceRecord::select_list(),
            ANIME_TABLE,
            quote_ident(column)
        );
        self.records(&sql, value.clone())
    }

    /// Execute a single arbitrary statement and collect its rows
    ///
    /// Input holding a second statement is rejected before anything runs;
    /// trailing whitespace, comments and a final `;` are fine.
    pub fn query(&self, sql: &str) -> Result<RowSet> {
        tracing::debug!(%sql, "running ad hoc query");
        let mut batch = Batch::new(&self.conn, sql);
        let mut stmt = batch.next().into_diagnostic()?.ok_or(DatabaseError::EmptyQuery)?;
        if batch.next().into_diagnostic()?.is_some() {
            return Err(DatabaseError::MultipleStatements.into());
        }
        collect_rows(&mut stmt, [])
    }

    fn records(&self, sql: &str, bound: SqlValue) -> Result<Vec<CrossReferenceRecord>> {
        let mut stmt = self.conn.prepare(sql).into_diagnostic()?;
        let records = stmt
            .query_map(params![bound], CrossReferenceRecord::from_row)
            .into_diagnostic()?
            .collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()?;
        Ok(records)
    }

    fn run<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<RowSet> {
        let mut stmt = self.conn.prepare(sql).into_diagnostic()?;
        collect_rows(&mut stmt, params)
    }

    fn ensure_table(&self, table: &str) -> Result<()> {
        if self.tables()?.iter().any(|t| t == table) {
            Ok(())
        } else {
            Err(DatabaseError::UnknownTable(table.to_string()).into())
        }
    }

    fn ensure_column(&self, table: &str, column: &str) -> Result<()> {
        let columns = self.columns(table)?;
        if columns.iter().any(|c| c.name == column) {
            return Ok(());
        }
        Err(DatabaseError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
            available: columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
        .into())
    }
}

fn collect_rows<P: rusqlite::Params>(stmt: &mut Statement<'_>, params: P) -> Result<RowSet> {
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let column_count = columns.len();

    let rows = stmt
        .query_map(params, |row| {
            (0..column_count)
                .map(|i| row.get::<_, SqlValue>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .into_diagnostic()?
        .collect::<std::result::Result<Vec<_>, _>>()
        .into_diagnostic()?;

    Ok(RowSet::new(columns, rows))
}

/// Quote an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
