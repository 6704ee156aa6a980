// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end tests for the `fitstream` binary.
//!
//! stdout must only ever carry JSON lines; failures are a single
//! `{"error": ...}` line plus exit code 1.

mod common;

use std::process::{Command, Output};

use common::{catalog_file, corrupt_ascii_file, parse_lines};
use serde_json::{json, Value};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fitstream"))
        .args(args)
        .output()
        .expect("failed to run fitstream")
}

fn run_ok(args: &[&str]) -> Vec<Value> {
    let output = run(args);
    assert!(
        output.status.success(),
        "fitstream {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    parse_lines(&output.stdout)
}

/// Run a command expected to fail and return its error text.
fn run_err(args: &[&str]) -> String {
    let output = run(args);
    assert_eq!(output.status.code(), Some(1), "fitstream {args:?}");

    let lines = parse_lines(&output.stdout);
    assert_eq!(lines.len(), 1, "expected one error line, got {lines:?}");
    let object = lines[0].as_object().unwrap();
    assert_eq!(object.len(), 1);
    object["error"].as_str().unwrap().to_string()
}

// ============================================================================
// info
// ============================================================================

#[test]
fn test_info_manifest() {
    let file = catalog_file(3);
    let lines = run_ok(&["info", file.path().to_str().unwrap()]);

    assert_eq!(lines.len(), 1);
    let units = lines[0].as_array().unwrap();
    assert_eq!(units.len(), 3);
    assert_eq!(
        units[0],
        json!({"index": 0, "name": "PRIMARY", "is_table": false, "kind": "primary"})
    );
    assert_eq!(units[2]["name"], "CATALOG");
    assert_eq!(units[2]["is_table"], true);
    assert_eq!(units[2]["kind"], "binary_table");
    assert_eq!(units[2]["rows"], 3);
}

#[test]
fn test_info_missing_file() {
    let error = run_err(&["info", "/nonexistent/catalog.fits"]);
    assert!(error.contains("not found"), "{error}");
}

// ============================================================================
// data
// ============================================================================

#[test]
fn test_data_stream() {
    let file = catalog_file(1200);
    let lines = run_ok(&["data", file.path().to_str().unwrap(), "2"]);

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["total_rows"], 1200);
    assert_eq!(lines[0]["data"], json!([]));
    assert_eq!(lines[0]["warning"], Value::Null);

    let progress: Vec<u64> = lines[1..]
        .iter()
        .map(|l| l["progress"].as_u64().unwrap())
        .collect();
    assert_eq!(progress, vec![500, 1000, 1200]);
    assert_eq!(lines[1]["data"][0]["NAME"], "SRC0");
}

#[test]
fn test_data_caps() {
    let file = catalog_file(50);
    let lines = run_ok(&[
        "data",
        file.path().to_str().unwrap(),
        "2",
        "--max-rows",
        "10",
        "--max-cols",
        "1",
    ]);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["total_rows"], 10);
    assert_eq!(
        lines[0]["warning"],
        json!("Showing the first 10 of 50 rows. Showing the first 1 of 4 columns.")
    );
    assert_eq!(lines[1]["data"][9], json!({"ID": 9}));
}

#[test]
fn test_data_negative_caps_are_unlimited() {
    let file = catalog_file(5);
    let lines = run_ok(&[
        "data",
        file.path().to_str().unwrap(),
        "2",
        "--max-rows",
        "-1",
    ]);
    assert_eq!(lines[0]["total_rows"], 5);
    assert_eq!(lines[0]["warning"], Value::Null);
}

#[test]
fn test_data_columns_and_chunk_size() {
    let file = catalog_file(5);
    let lines = run_ok(&[
        "data",
        file.path().to_str().unwrap(),
        "2",
        "--columns",
        "FLUX,ID",
        "--chunk-size",
        "2",
    ]);

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0]["schema"]["fields"],
        json!([
            {"name": "ID", "type": "integer"},
            {"name": "FLUX", "type": "number"}
        ])
    );
    let progress: Vec<u64> = lines[1..]
        .iter()
        .map(|l| l["progress"].as_u64().unwrap())
        .collect();
    assert_eq!(progress, vec![2, 4, 5]);
}

#[test]
fn test_data_mid_stream_error() {
    let file = corrupt_ascii_file(1200, 700);
    let output = run(&["data", file.path().to_str().unwrap(), "1"]);

    assert_eq!(output.status.code(), Some(1));
    let lines = parse_lines(&output.stdout);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].get("schema").is_some());
    assert_eq!(lines[1]["progress"], 500);
    assert!(lines[2]["error"].as_str().unwrap().contains("oops"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_data_index_out_of_bounds() {
    let file = catalog_file(2);
    let error = run_err(&["data", file.path().to_str().unwrap(), "7"]);
    assert!(error.contains("out of bounds"), "{error}");

    let error = run_err(&["data", file.path().to_str().unwrap(), "-1"]);
    assert!(error.contains("out of bounds"), "{error}");
}

#[test]
fn test_data_not_a_table() {
    let file = catalog_file(2);
    let error = run_err(&["data", file.path().to_str().unwrap(), "1"]);
    assert!(error.contains("not a table"), "{error}");
}

#[test]
fn test_data_non_integer_index() {
    let file = catalog_file(2);
    let error = run_err(&["data", file.path().to_str().unwrap(), "abc"]);
    assert!(error.contains("must be an integer"), "{error}");
}

#[test]
fn test_data_missing_index() {
    let file = catalog_file(2);
    let error = run_err(&["data", file.path().to_str().unwrap()]);
    assert!(!error.is_empty());
}

#[test]
fn test_data_unknown_column() {
    let file = catalog_file(2);
    let error = run_err(&["data", file.path().to_str().unwrap(), "2", "--columns", "MAG"]);
    assert!(error.contains("MAG"), "{error}");
}

#[test]
fn test_no_arguments() {
    assert_eq!(run_err(&[]), "Insufficient arguments.");
}

#[test]
fn test_unknown_subcommand() {
    let error = run_err(&["frobnicate"]);
    assert!(error.contains("frobnicate"), "{error}");
}

#[test]
fn test_help_succeeds() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("info"));
}
