//! Tests for config discovery and validation.

use crate::support::*;

#[test]
fn test_missing_explicit_config() {
    let t = Test::new();

    let output = t.run_with_config("nope.yml", &["true"]);
    output
        .expect_failure()
        .expect_stderr("config file not found");
}

#[test]
fn test_no_config_requires_server_url() {
    let t = Test::new();

    let output = t.run(&["true"]);
    output
        .expect_failure()
        .expect_stderr("secret_server.url");
}

#[test]
fn test_config_without_url() {
    let t = Test::new();
    t.write("custom.yml", NO_URL_CONFIG);

    let output = t.run_with_config("custom.yml", &["true"]);
    output
        .expect_failure()
        .expect_stderr("missing required field: secret_server.url");
}

#[test]
fn test_config_discovered_in_working_dir() {
    let t = Test::with_config(MALFORMED_CONFIG);

    let output = t.run(&["true"]);
    output
        .expect_failure()
        .expect_stderr("failed to parse config");
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_discovered_in_user_config_dir() {
    let t = Test::new();
    let dir = t.home.path().join(".config").join("esi");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("esi.yml"), MALFORMED_CONFIG).unwrap();

    let output = t.run(&["true"]);
    output
        .expect_failure()
        .expect_stderr("failed to parse config");
}

#[test]
fn test_config_from_env_var() {
    let t = Test::new();
    let path = t.write("elsewhere.yml", MALFORMED_CONFIG);

    let output = t
        .cmd()
        .env("ESI_CONFIG", &path)
        .args(["--", "true"])
        .output()
        .unwrap();
    output
        .expect_failure()
        .expect_stderr("failed to parse config");
}

#[test]
fn test_login_validates_config() {
    let t = Test::new();
    t.write("custom.yml", NO_URL_CONFIG);

    let output = t
        .cmd()
        .args(["login", "--config", "custom.yml"])
        .output()
        .unwrap();
    output
        .expect_failure()
        .expect_stderr("secret_server.url");
}
