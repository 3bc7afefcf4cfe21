//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, config::ConfigCommands, db::DbCommands,
    dupes::DupesArgs, lookup::LookupArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "animap")]
#[command(author, version, about = "Anime ID mapping inspector")]
#[command(long_about = "Read-only inspection of anime cross-reference mappings (MyAnimeList, TheTVDB, IMDb) stored as a JSON file or a SQLite database.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format (default: auto, or the `format` config key)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// JSON mapping file
    #[arg(long, global = true, env = "ANIMAP_MAPPINGS", value_name = "PATH")]
    pub mappings: Option<PathBuf>,

    /// SQLite mapping database
    #[arg(long = "db", global = true, env = "ANIMAP_DATABASE", value_name = "PATH")]
    pub database: Option<PathBuf>,
}

impl GlobalOpts {
    /// Effective output format: flag, then config, then auto
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.format
            .or_else(|| {
                config
                    .format
                    .as_deref()
                    .and_then(|name| OutputFormat::from_str(name, true).ok())
            })
            .unwrap_or_default()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the record holding an identifier in the JSON mapping
    Lookup(LookupArgs),

    /// Count unique and duplicated identifier values in the JSON mapping
    Dupes(DupesArgs),

    /// Look up a MAL ID, then check IMDb ID duplication in the JSON mapping
    Analyze(AnalyzeArgs),

    /// Inspect the SQLite mapping database
    #[command(subcommand)]
    Db(DbCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table for terminals, pretty JSON for documents
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Markdown tables
    Md,
}

impl OutputFormat {
    /// Formats that print a single machine-readable document
    pub fn is_structured(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}
