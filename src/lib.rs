//! animap: anime ID mapping inspector
//!
//! Read-only lookups, duplicate statistics and schema introspection over an
//! anime cross-reference dataset (MyAnimeList, TheTVDB, IMDb), stored either
//! as a JSON mapping file or as a SQLite database.

pub mod cli;
pub mod core;
