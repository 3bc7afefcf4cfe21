//! Typed view of one row of the `anime` cross-reference table

use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::Serialize;

/// One anime title's identifiers across MAL, TheTVDB and IMDb
///
/// IMDb IDs are not unique: a single IMDb season can be split across several
/// MAL entries that aired separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossReferenceRecord {
    pub mal_id: Option<i64>,
    pub mal_title: Option<String>,
    pub thetvdb_season: Option<i64>,
    pub thetvdb_part: Option<i64>,
    pub anime_media_episodes: Option<i64>,
    pub global_media_episodes: Option<i64>,
    pub imdb_id: Option<String>,
}

impl CrossReferenceRecord {
    /// Column names in select order
    pub const COLUMNS: [&'static str; 7] = [
        "mal_id",
        "mal_title",
        "thetvdb_season",
        "thetvdb_part",
        "anime_media_episodes",
        "global_media_episodes",
        "imdb_id",
    ];

    /// Comma separated select list matching [`Self::COLUMNS`]
    pub fn select_list() -> String {
        Self::COLUMNS.join(", ")
    }

    /// Build from a row selected with [`Self::select_list`]
    ///
    /// Cells are read loosely: the dataset is produced elsewhere and column
    /// affinity is not guaranteed.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            mal_id: int_cell(row.get(0)?),
            mal_title: text_cell(row.get(1)?),
            thetvdb_season: int_cell(row.get(2)?),
            thetvdb_part: int_cell(row.get(3)?),
            anime_media_episodes: int_cell(row.get(4)?),
            global_media_episodes: int_cell(row.get(5)?),
            imdb_id: text_cell(row.get(6)?),
        })
    }

    /// Cells in [`Self::COLUMNS`] order, for table rendering
    pub fn to_cells(&self) -> Vec<SqlValue> {
        let int = |v: Option<i64>| v.map(SqlValue::Integer).unwrap_or(SqlValue::Null);
        let text = |v: &Option<String>| v.clone().map(SqlValue::Text).unwrap_or(SqlValue::Null);
        vec![
            int(self.mal_id),
            text(&self.mal_title),
            int(self.thetvdb_season),
            int(self.thetvdb_part),
            int(self.anime_media_episodes),
            int(self.global_media_episodes),
            text(&self.imdb_id),
        ]
    }
}

fn int_cell(value: SqlValue) -> Option<i64> {
    match value {
        SqlValue::Integer(i) => Some(i),
        SqlValue::Real(f) if f.fract() == 0.0 => Some(f as i64),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_cell(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Text(s) => Some(s),
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}
