// ==============================================================================
// CLI Integration Tests: Exercise the `avdl-syntax` Binary via Subprocess
// ==============================================================================
//
// These tests run the compiled binary with `assert_cmd`, checking exit codes
// and what lands on stdout and stderr for each subcommand.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const SIMPLE: &str = "tests/fixtures/simple.avdl";

#[allow(deprecated)] // cargo_bin() warns about custom build-dir; acceptable here
fn cmd() -> Command {
    Command::cargo_bin("avdl-syntax").expect("avdl-syntax binary should be built by cargo")
}

// ==============================================================================
// `parse`
// ==============================================================================

#[test]
fn test_cli_parse_file() {
    cmd()
        .args(["parse", SIMPLE])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "(program (comment) (protocol_declaration (annotation_statement",
        ));
}

#[test]
fn test_cli_parse_json() {
    let output = cmd()
        .args(["parse", "--json", SIMPLE])
        .output()
        .expect("run avdl-syntax parse --json");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["source"], SIMPLE);
    assert_eq!(json["root"]["kind"], "program");
    assert_eq!(json["errors"], Value::Array(Vec::new()));
}

#[test]
fn test_cli_parse_stdin_with_errors() {
    cmd()
        .arg("parse")
        .write_stdin("record { }")
        .assert()
        .code(1)
        .stdout("(program (record_declaration (ERROR) (statement_block)))\n")
        .stderr(predicate::str::contains("expected a record name"));
}

#[test]
fn test_cli_parse_dash_reads_stdin() {
    cmd()
        .args(["parse", "-"])
        .write_stdin("fixed F;")
        .assert()
        .success()
        .stdout("(program (fixed_declaration (identifier)))\n");
}

#[test]
fn test_cli_input_limit() {
    cmd()
        .args(["--max-input-len", "4", "parse"])
        .write_stdin("record R {}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("over the limit of 4 bytes"));
}

#[test]
fn test_cli_depth_limit() {
    cmd()
        .args(["parse", "--max-depth", "2"])
        .write_stdin("record R { array<array<int>> deep; }")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("maximum depth of 2"));
}

// ==============================================================================
// `tokens`
// ==============================================================================

#[test]
fn test_cli_tokens() {
    cmd()
        .arg("tokens")
        .write_stdin("record R { // hi\n}")
        .assert()
        .success()
        .stdout(
            "Identifier 0..6 \"record\"\n\
             Identifier 7..8 \"R\"\n\
             LBrace 9..10 \"{\"\n\
             Comment 11..16 \"// hi\"\n\
             RBrace 17..18 \"}\"\n",
        );
}

#[test]
fn test_cli_tokens_reports_lexical_errors() {
    cmd()
        .arg("tokens")
        .write_stdin("#")
        .assert()
        .success()
        .stdout("Error 0..1 \"#\" ; unexpected character\n");
}

// ==============================================================================
// `check`
// ==============================================================================

#[test]
fn test_cli_check_fixtures() {
    cmd()
        .args(["check", "tests/fixtures"])
        .assert()
        .success()
        .stderr(predicate::str::contains("checked 3 file(s): no errors"));
}

#[test]
fn test_cli_check_reports_broken_files() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::create_dir(dir.path().join("nested")).expect("create nested dir");
    fs::write(dir.path().join("good.avdl"), "record Good { int x; }").expect("write good");
    fs::write(dir.path().join("nested/bad.avdl"), "record { }").expect("write bad");
    fs::write(dir.path().join("notes.txt"), "record { }").expect("write ignored");

    cmd()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.avdl"))
        .stderr(predicate::str::contains(
            "checked 2 file(s): 1 with errors (avdl::syntax: 1)",
        ));
}

#[test]
fn test_cli_check_missing_file() {
    cmd()
        .args(["check", "tests/fixtures/does-not-exist.avdl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.avdl"));
}

// ==============================================================================
// `fmt`
// ==============================================================================

#[test]
fn test_cli_fmt() {
    cmd()
        .arg("fmt")
        .write_stdin("protocol P{enum E{A,B}}")
        .assert()
        .success()
        .stdout("protocol P {\n    enum E { A, B }\n}\n");
}

#[test]
fn test_cli_fmt_is_idempotent_on_fixture() {
    let first = cmd().args(["fmt", SIMPLE]).output().expect("run fmt");
    assert!(first.status.success());
    let second = cmd()
        .arg("fmt")
        .write_stdin(first.stdout.clone())
        .output()
        .expect("run fmt again");
    assert!(second.status.success());
    assert_eq!(
        String::from_utf8_lossy(&first.stdout),
        String::from_utf8_lossy(&second.stdout)
    );
}

#[test]
fn test_cli_fmt_refuses_broken_input() {
    cmd()
        .arg("fmt")
        .write_stdin("record { }")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("expected a record name"));
}

// ==============================================================================
// Usage
// ==============================================================================

#[test]
fn test_cli_help_and_version() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: avdl-syntax"));
    cmd()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("avdl-syntax "));
}

#[test]
fn test_cli_usage_errors() {
    cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command `frobnicate`"));
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing command"));
    cmd()
        .args(["tokens", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only applies to `parse`"));
}
