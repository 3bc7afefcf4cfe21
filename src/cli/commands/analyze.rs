//! `animap analyze` command - MAL lookup followed by an IMDb duplicate check
//!
//! Answers two questions in one pass over the JSON mapping: which record
//! owns a MAL ID, and how far IMDb IDs can be trusted for a reverse
//! IMDb -> MAL lookup.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Value};

use crate::cli::commands::dupes::{print_report, report_document};
use crate::cli::helpers::{entries_document, format_document, open_mappings};
use crate::cli::GlobalOpts;
use crate::core::{Config, Identifier};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// MyAnimeList ID to look up
    pub mal_id: i64,

    /// Field holding MAL IDs
    #[arg(long, default_value = "mal_id")]
    pub mal_field: String,

    /// Field checked for duplicates
    #[arg(long, default_value = "imdb_id")]
    pub imdb_field: String,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = global.output_format(&config);
    let mapping = open_mappings(global, &config)?;

    let target = Identifier::Int(args.mal_id);
    let found = mapping.find_first(&args.mal_field, &target);
    let report = mapping.duplicates(&args.imdb_field);

    if format.is_structured() {
        let entry = found
            .map(|entry| entries_document(&[entry]))
            .unwrap_or(Value::Null);
        let doc = json!({
            "mal_id": args.mal_id,
            "entry": entry,
            "duplicates": report_document(&report, false)?,
        });
        println!("{}", format_document(&doc, format)?);
        return Ok(());
    }

    println!("Entry for MAL ID {}:", args.mal_id);
    match found {
        Some(entry) => {
            let doc = serde_json::to_string_pretty(&entries_document(&[entry])).into_diagnostic()?;
            println!("{}", doc);
        }
        None => println!("{} No entry with {} = {}", style("✗").yellow(), args.mal_field, target),
    }

    println!();
    println!("Checking duplicates for {}...", args.imdb_field);
    print_report(&report, false, format)
}
