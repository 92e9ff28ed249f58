mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use common::{FEBRUARY, NOT_A_STATEMENT, STATEMENT, write_text_pdf};

fn folio(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("folio").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn test_parse_text_statement_to_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.txt");
    fs::write(&input, STATEMENT).unwrap();

    let output = folio(dir.path())
        .args(["parse", input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["account_number"], "01234-5678901");
    let transactions = summary["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["description"], "Payroll deposit ACME CORP");
    assert_eq!(transactions[0]["type"], "deposit");
    assert_eq!(transactions[0]["posted_on"], "2025-12-12");
    assert_eq!(
        transactions[1]["description"],
        "Visa Debit purchase - 5432 UBER CANADA TORONTO"
    );
    assert_eq!(transactions[1]["category"], "Rideshare");
    assert_eq!(transactions[1]["type_line"], "Visa Debit purchase - 5432");
    assert_eq!(transactions[1]["merchant"], "UBER CANADA TORONTO");
    assert_eq!(transactions[1]["statement_period"], "Dec 2025 - Jan 2026");
}

#[test]
fn test_parse_csv_transactions_only() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.txt");
    let output = dir.path().join("out.csv");
    fs::write(&input, STATEMENT).unwrap();

    folio(dir.path())
        .args(["parse", input.to_str().unwrap(), "--format", "csv", "--transactions-only"])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let mut rows = csv.lines();
    assert_eq!(
        rows.next(),
        Some(
            "date,posted_on,description,type_line,merchant,amount,type,balance,category,statement_period"
        )
    );
    let payroll = rows.next().unwrap();
    assert!(payroll.starts_with("12 Dec,2025-12-12,Payroll deposit ACME CORP,Payroll deposit ACME CORP,,"));
    assert!(payroll.ends_with(",Income,Dec 2025 - Jan 2026"));
    let uber = rows.next().unwrap();
    assert!(uber.contains(",Visa Debit purchase - 5432,UBER CANADA TORONTO,"));
    assert!(uber.contains(",withdrawal,"));
    assert_eq!(rows.next(), None);
}

#[test]
fn test_parse_validate_reports_nothing_for_consistent_statement() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.txt");
    fs::write(&input, STATEMENT).unwrap();

    folio(dir.path())
        .args(["parse", input.to_str().unwrap(), "--validate", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account: 01234-5678901"))
        .stderr(predicate::str::contains("Validation issues").not());
}

#[test]
fn test_parse_without_activity_marker_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("letter.txt");
    fs::write(&input, NOT_A_STATEMENT).unwrap();

    folio(dir.path())
        .args(["parse", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("details of your account activity"));
}

#[test]
fn test_parse_unsupported_extension_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.docx");
    fs::write(&input, STATEMENT).unwrap();

    folio(dir.path())
        .args(["parse", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format: docx"));
}

#[test]
fn test_parse_pdf_statement() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.pdf");
    write_text_pdf(&input, STATEMENT).unwrap();

    folio(dir.path())
        .args(["parse", input.to_str().unwrap(), "--transactions-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payroll deposit ACME CORP"))
        .stdout(predicate::str::contains("UBER CANADA TORONTO"));
}

#[test]
fn test_inspect_annotates_tokens() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.txt");
    fs::write(&input, STATEMENT).unwrap();

    folio(dir.path())
        .args(["inspect", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Activity]"))
        .stdout(predicate::str::contains("12 Dec<date>"));
}

#[test]
fn test_batch_merges_in_date_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), FEBRUARY).unwrap();
    fs::write(dir.path().join("b.txt"), STATEMENT).unwrap();
    let pattern = dir.path().join("*.txt");

    let output = folio(dir.path())
        .args(["batch", pattern.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let merged: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = merged.as_array().unwrap();
    let order: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r["source"].as_str().unwrap(), r["date"].as_str().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![("b.txt", "12 Dec"), ("b.txt", "3 Jan"), ("a.txt", "5 Feb")]
    );
}

#[test]
fn test_batch_stops_on_error_unless_asked_to_continue() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), STATEMENT).unwrap();
    fs::write(dir.path().join("b.txt"), NOT_A_STATEMENT).unwrap();
    let pattern = dir.path().join("*.txt");
    let summary = dir.path().join("summary.csv");

    folio(dir.path())
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("b.txt"));

    folio(dir.path())
        .args(["batch", pattern.to_str().unwrap(), "--continue-on-error", "--format", "csv"])
        .args(["--summary", summary.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "source,date,posted_on,description,type_line,merchant,",
        ))
        .stderr(predicate::str::contains("Failed files"));

    let report = fs::read_to_string(&summary).unwrap();
    assert!(report.contains("a.txt,success,01234-5678901"));
    assert!(report.contains("b.txt,error"));
}

#[test]
fn test_config_show_defaults() {
    let dir = tempdir().unwrap();

    folio(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lookahead_window\": 5"))
        .stderr(predicate::str::contains("showing defaults"));
}

#[test]
fn test_config_show_one_section() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("custom.json");
    let config = config.to_str().unwrap();

    folio(dir.path())
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    folio(dir.path())
        .args(["--config", config, "config", "show", "pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_pages"))
        .stdout(predicate::str::contains("lookahead_window").not())
        .stderr(predicate::str::contains("Using").and(predicate::str::contains("custom.json")));
}

#[test]
fn test_config_init_set_get_reset() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("folio.json");
    let config = config.to_str().unwrap();

    folio(dir.path())
        .args(["--config", config, "config", "init"])
        .assert()
        .success();
    assert!(Path::new(config).exists());

    folio(dir.path())
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    folio(dir.path())
        .args(["--config", config, "config", "set", "parser.lookahead_window", "3"])
        .assert()
        .success();

    folio(dir.path())
        .args(["--config", config, "config", "get", "parser.lookahead_window"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    folio(dir.path())
        .args(["--config", config, "config", "reset", "parser.lookahead_window"])
        .assert()
        .success();

    folio(dir.path())
        .args(["--config", config, "config", "get", "parser.lookahead_window"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    folio(dir.path())
        .args(["--config", config, "config", "set", "parser.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    folio(dir.path())
        .args(["--config", config, "config", "set", "ocr.threshold", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config section"));

    folio(dir.path())
        .args(["--config", config, "config", "set", "parser.lookahead_window", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}
