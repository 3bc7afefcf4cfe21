//! Core module - data sources, identifiers and configuration

pub mod config;
pub mod database;
pub mod identifier;
pub mod mapping;
pub mod record;

pub use config::{Config, ConfigError};
pub use database::{
    AnimeDatabase, ColumnInfo, DatabaseError, DuplicateGroup, RowSet, TitleMatch, ANIME_TABLE,
};
pub use identifier::Identifier;
pub use mapping::{Duplicate, DuplicateReport, MappingError, MappingFile};
pub use record::CrossReferenceRecord;
