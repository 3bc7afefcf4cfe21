//! `animap config` command - Configuration inspection
//!
//! Shows the effective configuration after merging the global file, the
//! local `.animap.yaml` and any flag or environment overrides.

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::config::LOCAL_CONFIG_FILE;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show {
        /// Show only this key's value
        key: Option<String>,
    },

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("mappings", "Path to the JSON mapping file"),
    ("database", "Path to the SQLite mapping database"),
    ("sample_rows", "Rows shown per table by `animap db schema`"),
    ("format", "Default output format (auto, tsv, csv, json, yaml, md)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show { key } => run_show(key.as_deref(), global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

/// Config with flag and environment overrides applied
fn effective_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(path) = &global.mappings {
        config.mappings = Some(path.clone());
    }
    if let Some(path) = &global.database {
        config.database = Some(path.clone());
    }
    config
}

fn get_config_value(config: &Config, key: &str) -> Result<Option<String>> {
    let value = match key {
        "mappings" => config.mappings.as_ref().map(|p| p.display().to_string()),
        "database" => config.database.as_ref().map(|p| p.display().to_string()),
        "sample_rows" => Some(config.sample_rows().to_string()),
        "format" => config.format.clone(),
        _ => {
            return Err(miette::miette!(
                help = "run `animap config keys` to list valid keys",
                "Unknown config key '{}'",
                key
            ))
        }
    };
    Ok(value)
}

fn run_show(key: Option<&str>, global: &GlobalOpts) -> Result<()> {
    let config = effective_config(global);

    if let Some(key) = key {
        match get_config_value(&config, key)? {
            Some(v) => println!("{}", v),
            None => return Err(miette::miette!("Key '{}' is not set", key)),
        }
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        let value = get_config_value(&config, key)?;
        print_config_value(key, value.as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Flags and environment variables (--mappings/ANIMAP_MAPPINGS, --db/ANIMAP_DATABASE)");
    println!("  2. Local config ({})", LOCAL_CONFIG_FILE);
    println!("  3. Global config (~/.config/animap/config.yaml)");

    Ok(())
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {:<12} {}", style(key).cyan(), v),
        None => println!("  {:<12} {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn run_path() -> Result<()> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(LOCAL_CONFIG_FILE))
        .map_err(|e| miette::miette!("Cannot determine current directory: {}", e))?;
    print_path("Local", &local);

    match Config::global_config_path() {
        Some(path) => print_path("Global", &path),
        None => println!("  {:<8} {}", "Global", style("(no config directory)").dim()),
    }
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let marker = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not found)").dim()
    };
    println!("  {:<8} {} {}", label, path.display(), marker);
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available Configuration Keys").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<12} {}", style(key).cyan(), description);
    }
    Ok(())
}
