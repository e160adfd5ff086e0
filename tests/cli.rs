//! Smoke tests for the command-line binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn script(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".cgs")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn runs_a_script_and_prints_root_properties() {
    let file = script("a = 1\nb = a + 2\n");

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a = 1"))
        .stdout(predicate::str::contains("b = 3"));
}

#[test]
fn prints_a_non_null_result() {
    let file = script("return 2 + 3\n");

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("result: 5"));
}

#[test]
fn rejects_wrong_extension() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(b"a = 1\n").unwrap();

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a .cgs file"));
}

#[test]
fn dumps_tokens() {
    let file = script("a = 1\n");

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg("--tokens")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Identifier"))
        .stdout(predicate::str::contains("Number"));
}

#[test]
fn dumps_bytecode() {
    let file = script("a = 1\n");

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg("--bc")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("PushInt 1"))
        .stdout(predicate::str::contains("AssignGlobal"));
}

#[test]
fn reports_compile_errors_on_stderr() {
    let file = script("a = \n");

    Command::cargo_bin("gearscript")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn prints_usage_without_arguments() {
    Command::cargo_bin("gearscript")
        .unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}
