//! `animap dupes` command - Duplicate identifier statistics for the JSON mapping

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{format_document, open_mappings};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, DuplicateReport};

#[derive(clap::Args, Debug)]
pub struct DupesArgs {
    /// Record field to check
    #[arg(long, default_value = "imdb_id")]
    pub field: String,

    /// List every repeated value with the records involved
    #[arg(long)]
    pub show: bool,
}

pub fn run(args: DupesArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = global.output_format(&config);
    let mapping = open_mappings(global, &config)?;

    let report = mapping.duplicates(&args.field);
    print_report(&report, args.show, format)
}

/// Print a duplicate report as text or as a document
pub(crate) fn print_report(report: &DuplicateReport, show: bool, format: OutputFormat) -> Result<()> {
    if format.is_structured() {
        println!("{}", format_document(&report_document(report, show)?, format)?);
        return Ok(());
    }

    println!("Total entries: {}", report.total_records);
    println!("Records with {}: {}", report.field, report.records_with_values);
    println!("Unique {} values mapped: {}", report.field, report.unique_values());
    println!("Duplicate {} references: {}", report.field, report.duplicate_count());

    if show && !report.repeats.is_empty() {
        println!();
        for dup in &report.repeats {
            println!(
                "  Duplicate {}: {} -> {} and {}",
                report.field,
                style(&dup.value).cyan(),
                dup.first_key,
                dup.key
            );
        }
    }

    Ok(())
}

pub(crate) fn report_document(report: &DuplicateReport, show: bool) -> Result<serde_json::Value> {
    let mut doc = serde_json::to_value(report.summary()).into_diagnostic()?;
    if show {
        doc["repeats"] = json!(report.repeats);
    }
    Ok(doc)
}
