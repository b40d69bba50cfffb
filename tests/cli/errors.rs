//! Tests for argument errors.

use crate::support::*;

#[test]
fn test_no_command() {
    let t = Test::new();

    let output = t.cmd().output().unwrap();
    output
        .expect_failure()
        .expect_code(1)
        .expect_stderr("no command specified");
}

#[test]
fn test_shell_requires_command() {
    let t = Test::new();

    let output = t.cmd().arg("shell").output().unwrap();
    output.expect_failure();
}

#[test]
fn test_login_rejects_arguments() {
    let t = Test::new();

    let output = t.cmd().args(["login", "extra"]).output().unwrap();
    output.expect_failure();
}

#[test]
fn test_debug_flag_accepted() {
    let t = Test::new();

    let output = t.cmd().args(["--debug", "version"]).output().unwrap();
    output.expect_success();
}
