//! Integration tests for the animap CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd against
//! a small JSON mapping and SQLite database written into a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAPPINGS: &str = r#"{
    "aot-s3p2": {"mal_id": 38524, "imdb_id": "tt2560140", "tvdb_id": 267440},
    "aot-s3p2-dup": {"mal_id": [38524, 99999], "imdb_id": "tt2560140"},
    "aot-s3p1": {"mal_id": [35760], "imdb_id": ["tt2560140"]},
    "one-piece": {"mal_id": 21, "imdb_id": "tt0388629"},
    "no-ids": {"anidb_id": 69},
    "null-ids": {"mal_id": null, "imdb_id": ""}
}"#;

const DATABASE: &str = r#"
    CREATE TABLE anime (
        mal_id INTEGER PRIMARY KEY,
        mal_title TEXT NOT NULL,
        thetvdb_season INTEGER,
        thetvdb_part INTEGER,
        anime_media_episodes INTEGER,
        global_media_episodes INTEGER,
        imdb_id TEXT
    );
    CREATE TABLE meta (key TEXT, value TEXT);
    INSERT INTO anime VALUES (16498, 'Shingeki no Kyojin', 1, NULL, 25, 25, 'tt2560140');
    INSERT INTO anime VALUES (35760, 'Shingeki no Kyojin Season 3', 3, 1, 12, 22, 'tt2560140');
    INSERT INTO anime VALUES (38524, 'Shingeki no Kyojin Season 3 Part 2', 3, 2, 10, 22, 'tt2560140');
    INSERT INTO anime VALUES (21, 'One Piece', 1, NULL, NULL, 1100, 'tt0388629');
    INSERT INTO anime VALUES (1, 'Cowboy Bebop', 1, NULL, 26, 26, NULL);
    INSERT INTO meta VALUES ('version', '2');
"#;

/// Test workspace holding the fixtures
struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("mappings.json"), MAPPINGS).unwrap();
        let conn = Connection::open(tmp.path().join("anime_mappings.db")).unwrap();
        conn.execute_batch(DATABASE).unwrap();
        Self { tmp }
    }

    fn path(&self) -> &Path {
        self.tmp.path()
    }

    fn mappings(&self) -> PathBuf {
        self.path().join("mappings.json")
    }

    fn database(&self) -> PathBuf {
        self.path().join("anime_mappings.db")
    }

    /// An animap command isolated from the user's config and environment
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("animap").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("HOME", self.path())
            .env_remove("ANIMAP_MAPPINGS")
            .env_remove("ANIMAP_DATABASE")
            .env_remove("ANIMAP_LOG");
        cmd
    }

    fn json_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--mappings").arg(self.mappings());
        cmd
    }

    fn db_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--db").arg(self.database());
        cmd
    }
}

fn stdout_json(output: std::process::Output) -> serde_json::Value {
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    Fixture::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("anime"));
}

#[test]
fn test_version_displays() {
    Fixture::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("animap"));
}

#[test]
fn test_unknown_command_fails() {
    Fixture::new()
        .cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_generate() {
    Fixture::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("animap"));
}

// ============================================================================
// JSON Mapping: Lookup
// ============================================================================

#[test]
fn test_lookup_returns_first_match_only() {
    Fixture::new()
        .json_cmd()
        .args(["lookup", "38524"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry for mal_id 38524:"))
        .stdout(predicate::str::contains("\"aot-s3p2\": {"))
        .stdout(predicate::str::contains("\"tvdb_id\": 267440"))
        .stdout(predicate::str::contains("aot-s3p2-dup").not());
}

#[test]
fn test_lookup_all_returns_every_match() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["-f", "json", "lookup", "38524", "--all"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["aot-s3p2", "aot-s3p2-dup"]);
}

#[test]
fn test_lookup_inside_sequence() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["-f", "json", "lookup", "35760"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc["aot-s3p1"]["mal_id"][0], 35760);
}

#[test]
fn test_lookup_by_text_field() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["-f", "json", "lookup", "tt0388629", "--field", "imdb_id"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc["one-piece"]["mal_id"], 21);
}

#[test]
fn test_lookup_text_flag_does_not_match_integer_ids() {
    Fixture::new()
        .json_cmd()
        .args(["lookup", "38524", "--text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entry with mal_id = 38524"));
}

#[test]
fn test_lookup_not_found_is_not_an_error() {
    Fixture::new()
        .json_cmd()
        .args(["lookup", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entry"));
}

#[test]
fn test_lookup_reads_mappings_from_env() {
    let fx = Fixture::new();
    fx.cmd()
        .env("ANIMAP_MAPPINGS", fx.mappings())
        .args(["lookup", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one-piece"));
}

#[test]
fn test_lookup_without_mappings_fails() {
    Fixture::new()
        .cmd()
        .args(["lookup", "21"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no mapping file configured"));
}

#[test]
fn test_malformed_mapping_reports_syntax_error() {
    let fx = Fixture::new();
    let broken = fx.path().join("broken.json");
    fs::write(&broken, "{\n  \"a\": {\"mal_id\": 1,}\n}").unwrap();
    fx.cmd()
        .arg("--mappings")
        .arg(&broken)
        .args(["lookup", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON syntax error"));
}

// ============================================================================
// JSON Mapping: Duplicates and Analyze
// ============================================================================

#[test]
fn test_dupes_reports_counts() {
    Fixture::new()
        .json_cmd()
        .arg("dupes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 6"))
        .stdout(predicate::str::contains("Unique imdb_id values mapped: 2"))
        .stdout(predicate::str::contains("Duplicate imdb_id references: 2"));
}

#[test]
fn test_dupes_show_lists_repeats() {
    Fixture::new()
        .json_cmd()
        .args(["dupes", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Duplicate imdb_id: tt2560140 -> aot-s3p2 and aot-s3p2-dup",
        ))
        .stdout(predicate::str::contains(
            "Duplicate imdb_id: tt2560140 -> aot-s3p2 and aot-s3p1",
        ));
}

#[test]
fn test_dupes_json_counts_add_up() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["-f", "json", "dupes", "--field", "mal_id"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc["values_processed"], 5);
    assert_eq!(doc["unique_values"], 4);
    assert_eq!(doc["duplicates"], 1);
}

#[test]
fn test_analyze_runs_lookup_then_duplicate_check() {
    Fixture::new()
        .json_cmd()
        .args(["analyze", "38524"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry for MAL ID 38524:"))
        .stdout(predicate::str::contains("\"aot-s3p2\""))
        .stdout(predicate::str::contains("Checking duplicates for imdb_id..."))
        .stdout(predicate::str::contains("Duplicate imdb_id references: 2"));
}

#[test]
fn test_analyze_json_document() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["--format", "json", "analyze", "99999"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc["mal_id"], 99999);
    assert!(doc["entry"]["aot-s3p2-dup"].is_object());
    assert_eq!(doc["duplicates"]["total_records"], 6);
}

#[test]
fn test_analyze_missing_id() {
    let fx = Fixture::new();
    let output = fx
        .json_cmd()
        .args(["-f", "json", "analyze", "1"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert!(doc["entry"].is_null());
}

// ============================================================================
// SQLite Database
// ============================================================================

#[test]
fn test_db_tables() {
    Fixture::new()
        .db_cmd()
        .args(["db", "tables"])
        .assert()
        .success()
        .stdout("anime\nmeta\n");
}

#[test]
fn test_db_schema_prints_columns_and_sample() {
    Fixture::new()
        .db_cmd()
        .args(["db", "schema", "anime", "--rows", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema for anime:"))
        .stdout(predicate::str::contains("global_media_episodes"))
        .stdout(predicate::str::contains("First 2 rows of anime:"))
        .stdout(predicate::str::contains("Cowboy Bebop"))
        .stdout(predicate::str::contains("meta").not());
}

#[test]
fn test_db_schema_json_covers_every_table() {
    let fx = Fixture::new();
    let output = fx
        .db_cmd()
        .args(["-f", "json", "db", "schema", "-n", "1"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    let tables = doc.as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["table"], "anime");
    assert_eq!(tables[0]["columns"].as_array().unwrap().len(), 7);
    assert_eq!(tables[0]["rows"].as_array().unwrap().len(), 1);
    assert_eq!(tables[1]["rows"][0]["key"], "version");
}

#[test]
fn test_db_schema_unknown_table_fails() {
    Fixture::new()
        .db_cmd()
        .args(["db", "schema", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such table"));
}

#[test]
fn test_db_titles_contains() {
    let fx = Fixture::new();
    let output = fx
        .db_cmd()
        .args(["-q", "-f", "tsv", "db", "titles", "Shingeki no Kyojin"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let table = stdout.trim_end().replace('\t', " | ");
    insta::assert_snapshot!(table, @r"
    mal_id | mal_title | thetvdb_season | thetvdb_part | anime_media_episodes | global_media_episodes | imdb_id
    16498 | Shingeki no Kyojin | 1 | NULL | 25 | 25 | tt2560140
    35760 | Shingeki no Kyojin Season 3 | 3 | 1 | 12 | 22 | tt2560140
    38524 | Shingeki no Kyojin Season 3 Part 2 | 3 | 2 | 10 | 22 | tt2560140
    ");
}

#[test]
fn test_db_titles_prefix_and_exact() {
    let fx = Fixture::new();
    let output = fx
        .db_cmd()
        .args(["-f", "json", "db", "titles", "Shingeki no Kyojin Season 3", "--match", "prefix"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc.as_array().unwrap().len(), 2);

    let output = fx
        .db_cmd()
        .args(["-f", "json", "db", "titles", "One Piece", "--match", "exact"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    assert_eq!(doc[0]["mal_id"], 21);
    assert_eq!(doc[0]["global_media_episodes"], 1100);
    assert!(doc[0]["anime_media_episodes"].is_null());
}

#[test]
fn test_db_titles_no_match() {
    Fixture::new()
        .db_cmd()
        .args(["db", "titles", "Naruto"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No titles matching 'Naruto'"));
}

#[test]
fn test_db_dupes_groups_with_details() {
    Fixture::new()
        .db_cmd()
        .args(["db", "dupes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicate imdb_id values:"))
        .stdout(predicate::str::contains("tt2560140 (3 rows)"))
        .stdout(predicate::str::contains("Shingeki no Kyojin Season 3 Part 2"))
        .stdout(predicate::str::contains("tt0388629").not());
}

#[test]
fn test_db_dupes_json() {
    let fx = Fixture::new();
    let output = fx
        .db_cmd()
        .args(["-f", "json", "db", "dupes", "--column", "thetvdb_season"])
        .output()
        .unwrap();
    let doc = stdout_json(output);
    let groups = doc.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["value"], 1);
    assert_eq!(groups[0]["count"], 3);
    assert_eq!(groups[0]["records"].as_array().unwrap().len(), 3);
    assert_eq!(groups[1]["value"], 3);
}

#[test]
fn test_db_dupes_unknown_column_fails() {
    Fixture::new()
        .db_cmd()
        .args(["db", "dupes", "--column", "tvdb_id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such column"));
}

#[test]
fn test_db_query_csv() {
    Fixture::new()
        .db_cmd()
        .args([
            "-f",
            "csv",
            "db",
            "query",
            "SELECT mal_id, mal_title FROM anime WHERE mal_id = 21",
        ])
        .assert()
        .success()
        .stdout("mal_id,mal_title\n21,One Piece\n");
}

#[test]
fn test_db_query_cannot_write() {
    let fx = Fixture::new();
    fx.db_cmd()
        .args(["db", "query", "DELETE FROM anime"])
        .assert()
        .failure();

    let conn = Connection::open(fx.database()).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM anime", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 5);
}

#[test]
fn test_db_query_rejects_second_statement() {
    Fixture::new()
        .db_cmd()
        .args(["db", "query", "SELECT 1; DELETE FROM anime"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("only one SQL statement"));
}

#[test]
fn test_missing_database_is_not_created() {
    let fx = Fixture::new();
    let missing = fx.path().join("missing.db");
    fx.cmd()
        .arg("--db")
        .arg(&missing)
        .args(["db", "tables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database file not found"));
    assert!(!missing.exists());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_local_config_supplies_paths() {
    let fx = Fixture::new();
    fs::write(
        fx.path().join(".animap.yaml"),
        "database: anime_mappings.db\nmappings: mappings.json\nformat: tsv\n",
    )
    .unwrap();

    fx.cmd()
        .args(["db", "tables"])
        .assert()
        .success()
        .stdout("anime\nmeta\n");

    fx.cmd()
        .args(["-q", "db", "query", "SELECT COUNT(*) AS n FROM anime"])
        .assert()
        .success()
        .stdout("n\n5\n");

    fx.cmd()
        .args(["lookup", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one-piece"));
}

#[test]
fn test_config_show_reflects_flags() {
    let fx = Fixture::new();
    fx.db_cmd()
        .args(["config", "show", "database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anime_mappings.db"));

    fx.cmd()
        .args(["config", "show", "sample_rows"])
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn test_config_show_unset_key_fails() {
    Fixture::new()
        .cmd()
        .args(["config", "show", "mappings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}
