//! CLI wiring tests - summary, letters, annotate
//!
//! These commands never touch the external runtime; `run` is covered in
//! runner_tests.rs against a fake runtime.

mod common;

use common::{sigbar, write_csv, write_dataset, write_results};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// summary
// ============================================================================

#[test]
fn test_summary_table_output() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);

    sigbar()
        .args(["summary", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ctrl"))
        .stdout(predicate::str::contains("TrtA"))
        .stdout(predicate::str::contains("TrtB"));
}

#[test]
fn test_summary_csv_output() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);

    sigbar()
        .args(["summary", data.to_str().unwrap(), "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("group,n,mean,std,sem,median"))
        .stdout(predicate::str::contains("Ctrl,3,"));
}

#[test]
fn test_summary_custom_columns() {
    let tmp = TempDir::new().unwrap();
    let data = write_csv(
        &tmp,
        "wide.csv",
        "genotype,weight\nWT,10.1\nWT,10.4\nKO,12.0\nKO,11.8\n",
    );

    sigbar()
        .args([
            "summary",
            data.to_str().unwrap(),
            "-g",
            "genotype",
            "-v",
            "weight",
            "-f",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"group\": \"WT\""));
}

#[test]
fn test_summary_unknown_column_fails() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);

    sigbar()
        .args(["summary", data.to_str().unwrap(), "-v", "weight"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column not found"));
}

#[test]
fn test_summary_missing_file_fails() {
    sigbar()
        .args(["summary", "/nonexistent/data.csv"])
        .assert()
        .failure();
}

// ============================================================================
// letters
// ============================================================================

#[test]
fn test_letters_from_result_table() {
    let tmp = TempDir::new().unwrap();
    let results = write_results(&tmp);

    sigbar()
        .args(["letters", results.to_str().unwrap(), "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("group,letters"))
        .stdout(predicate::str::contains("TrtA,"))
        .stdout(predicate::str::contains("Ctrl,"))
        .stdout(predicate::str::contains("TrtB,"));
}

#[test]
fn test_letters_respects_explicit_group_order() {
    let tmp = TempDir::new().unwrap();
    let results = write_results(&tmp);

    let output = sigbar()
        .args([
            "letters",
            results.to_str().unwrap(),
            "--groups",
            "Ctrl,TrtA,TrtB",
            "-f",
            "csv",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[1].starts_with("Ctrl,"));
    assert!(lines[2].starts_with("TrtA,"));
    assert!(lines[3].starts_with("TrtB,"));
}

#[test]
fn test_letters_groups_sharing_no_significance_share_a_letter() {
    let tmp = TempDir::new().unwrap();
    let results = write_results(&tmp);

    let output = sigbar()
        .args(["letters", results.to_str().unwrap(), "-f", "csv"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let letter_of = |group: &str| -> String {
        stdout
            .lines()
            .find(|l| l.starts_with(&format!("{group},")))
            .and_then(|l| l.split(',').nth(1))
            .unwrap_or("")
            .to_string()
    };

    // Ctrl vs TrtB is the only non-significant pair
    assert_eq!(letter_of("Ctrl"), letter_of("TrtB"));
    assert_ne!(letter_of("TrtA"), letter_of("Ctrl"));
}

#[test]
fn test_letters_unusable_result_table_fails() {
    let tmp = TempDir::new().unwrap();
    let results = write_csv(&tmp, "bad.csv", "contrast,estimate\nx,1.0\n");

    sigbar()
        .args(["letters", results.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No pairwise comparisons"));
}

// ============================================================================
// annotate
// ============================================================================

#[test]
fn test_annotate_emits_bracket_layout() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);
    let results = write_results(&tmp);

    sigbar()
        .args([
            "annotate",
            results.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"brackets\""))
        .stdout(predicate::str::contains("\"glyph\": \"**\""));
}

#[test]
fn test_annotate_control_scope_emits_stars() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);
    let results = write_results(&tmp);

    let output = sigbar()
        .args([
            "annotate",
            results.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
            "-c",
            "Ctrl",
            "--scope",
            "control",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["brackets"].as_array().unwrap().is_empty());
    assert!(!parsed["stars"].as_array().unwrap().is_empty());
}

#[test]
fn test_annotate_no_significance_yields_empty_layout() {
    let tmp = TempDir::new().unwrap();
    let data = write_dataset(&tmp);
    let results = write_csv(
        &tmp,
        "ns.csv",
        "comparison,p.adj\nTrtA-Ctrl,0.9\nTrtB-Ctrl,0.8\nTrtB-TrtA,0.7\n",
    );

    let output = sigbar()
        .args([
            "annotate",
            results.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["brackets"].as_array().unwrap().is_empty());
    // everything ties, so every bar carries the same letter
    let letters = parsed["letters"].as_array().unwrap();
    assert_eq!(letters.len(), 3);
}
