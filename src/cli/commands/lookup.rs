//! `animap lookup` command - Find records by identifier in the JSON mapping

use console::style;
use miette::Result;

use crate::cli::helpers::{entries_document, format_document, open_mappings};
use crate::cli::GlobalOpts;
use crate::core::{Config, Identifier};

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Identifier to look for (numeric values match integer IDs)
    pub id: String,

    /// Record field holding the identifier(s)
    #[arg(long, default_value = "mal_id")]
    pub field: String,

    /// Print every matching record instead of the first
    #[arg(long)]
    pub all: bool,

    /// Match the identifier as a string even if it looks numeric
    #[arg(long)]
    pub text: bool,
}

pub fn run(args: LookupArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = global.output_format(&config);
    let mapping = open_mappings(global, &config)?;

    let target = if args.text {
        Identifier::text(args.id.trim())
    } else {
        Identifier::parse(&args.id)
    };

    let entries = if args.all {
        mapping.find_all(&args.field, &target)
    } else {
        mapping.find_first(&args.field, &target).into_iter().collect()
    };
    tracing::debug!(field = %args.field, %target, matches = entries.len(), "lookup finished");

    if entries.is_empty() {
        if format.is_structured() {
            println!("{}", format_document(&entries_document(&entries), format)?);
        } else if !global.quiet {
            println!(
                "{} No entry with {} = {}",
                style("✗").yellow(),
                args.field,
                target
            );
        }
        return Ok(());
    }

    if !format.is_structured() && !global.quiet {
        println!("Entry for {} {}:", args.field, target);
    }
    println!("{}", format_document(&entries_document(&entries), format)?);

    if args.all && !format.is_structured() && !global.quiet && entries.len() > 1 {
        println!(
            "{} {} records share {} {}",
            style("!").yellow(),
            entries.len(),
            args.field,
            target
        );
    }

    Ok(())
}
