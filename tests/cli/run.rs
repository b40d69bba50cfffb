//! Tests for the run path without a terminal.

use crate::support::*;

#[test]
fn test_nothing_spawned_without_credentials() {
    let t = Test::with_config(BASIC_CONFIG);
    let marker = t.dir.path().join("marker");

    let output = t.run(&["touch", marker.to_str().unwrap()]);
    output
        .expect_failure()
        .expect_code(1);
    assert!(!marker.exists(), "command ran without secrets");
}

#[test]
fn test_unknown_injector_is_not_fatal_by_itself() {
    let t = Test::with_config(BASIC_CONFIG);

    let output = t
        .cmd()
        .args(["--injector", "dev.missing", "--", "true"])
        .output()
        .unwrap();
    // Lookup failure is logged; the run only fails later at the prompt.
    output
        .expect_failure()
        .expect_stderr("failed to find injector by fqdn");
}

#[test]
fn test_no_secrets_on_stdout_after_failure() {
    let t = Test::with_config(BASIC_CONFIG);

    let output = t
        .cmd()
        .args(["shell", "--", "echo", "hello"])
        .output()
        .unwrap();
    output.expect_failure();
    assert!(output.stdout_text().is_empty());
}
