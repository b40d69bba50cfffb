//! Tests for version, help, and completions.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    output.expect_success();
    let out = output.stdout_text();
    assert!(out.contains("esi"));
    assert!(out.contains("shell"));
    assert!(out.contains("login"));
}

#[test]
fn test_version_command() {
    let t = Test::new();

    let output = t.version();
    output
        .expect_success()
        .expect_stdout(&format!("Version: {}", env!("CARGO_PKG_VERSION")))
        .expect_stdout("Commit:")
        .expect_stdout("BuiltBy:");
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions_bash() {
    let t = Test::new();

    let output = t.completions("bash");
    output.expect_success();
    let out = output.stdout_text();
    assert!(out.contains("_esi") || out.contains("complete"));
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();

    let output = t.completions("zsh");
    output
        .expect_success()
        .expect_stdout("#compdef esi");
}

#[test]
fn test_completions_fish() {
    let t = Test::new();

    let output = t.completions("fish");
    output
        .expect_success()
        .expect_stdout("complete -c esi");
}

#[test]
fn test_completions_unknown_shell() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
