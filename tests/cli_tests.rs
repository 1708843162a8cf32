//! Command-line tests for the `score` and `link` subcommands

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn fingerprint_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write temp file");
    }
    file
}

fn bloomlink() -> Command {
    Command::cargo_bin("bloomlink").expect("binary should build")
}

/// A[0] ~ B[1] and A[2] == B[0]; A[1] has no close partner
fn datasets() -> (NamedTempFile, NamedTempFile) {
    let a = fingerprint_file(&["# dataset A", "ffff0000", "00ff00ff", "0000ffff"]);
    let b = fingerprint_file(&["0x0000ffff", "", "ffff0001"]);
    (a, b)
}

#[test]
fn test_link_text_output() {
    let (a, b) = datasets();
    bloomlink()
        .arg("link")
        .arg(a.path())
        .arg(b.path())
        .args(["--threshold", "0.9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linkage Results"))
        .stdout(predicate::str::contains("Linked: 2 of 3 records"))
        .stdout(predicate::str::contains("A[0] -> B[1]"))
        .stdout(predicate::str::contains("A[2] -> B[0] (100.00%)"));
}

#[test]
fn test_link_json_output() {
    let (a, b) = datasets();
    let output = bloomlink()
        .args(["--format", "json", "link"])
        .arg(a.path())
        .arg(b.path())
        .args(["--method", "weighted", "--threshold", "0.9"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["method"], "weighted");
    assert_eq!(json["linked"], 2);
    let links = json["links"].as_array().expect("links array");
    assert_eq!(links[0]["index_a"], 0);
    assert_eq!(links[0]["index_b"], 1);
    assert_eq!(links[1]["index_a"], 2);
    assert_eq!(links[1]["index_b"], 0);
}

#[test]
fn test_score_tsv_top_k() {
    let (a, b) = datasets();
    let output = bloomlink()
        .args(["score", "--top-k", "1", "--format", "tsv"])
        .arg(a.path())
        .arg(b.path())
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "index_a\tindex_b\tscore");
    assert_eq!(lines[3], "2\t0\t1.000000");
}

#[test]
fn test_pass_through_requires_top_k() {
    let (a, b) = datasets();
    bloomlink()
        .arg("link")
        .arg(a.path())
        .arg(b.path())
        .args(["--method", "none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("top-k"));

    bloomlink()
        .arg("link")
        .arg(a.path())
        .arg(b.path())
        .args(["--method", "none", "--top-k", "2", "--threshold", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("none (pass-through)"));
}

#[test]
fn test_unknown_method_is_rejected() {
    let (a, b) = datasets();
    bloomlink()
        .arg("link")
        .arg(a.path())
        .arg(b.path())
        .args(["--method", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown matching method: 'fastest'"));
}

#[test]
fn test_invalid_threshold_is_rejected() {
    let (a, b) = datasets();
    bloomlink()
        .arg("link")
        .arg(a.path())
        .arg(b.path())
        .args(["--threshold", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid threshold"));
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    let a = fingerprint_file(&["ffff"]);
    let b = fingerprint_file(&["ffffffff"]);
    bloomlink()
        .arg("score")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("length mismatch"));
}

#[test]
fn test_malformed_file_names_the_path() {
    let a = fingerprint_file(&["not-hex"]);
    let (_, b) = datasets();
    bloomlink()
        .arg("score")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read fingerprints from"));
}
