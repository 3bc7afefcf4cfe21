//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod config;
pub mod db;
pub mod dupes;
pub mod lookup;
