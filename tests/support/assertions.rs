//! Assertions on finished esi processes.

use std::process::Output;

/// Chainable checks on a command's output.
pub trait OutputExt {
    fn stdout_text(&self) -> String;
    fn stderr_text(&self) -> String;
    fn expect_success(&self) -> &Self;
    fn expect_failure(&self) -> &Self;
    /// Exit status must be exactly `code`.
    fn expect_code(&self, code: i32) -> &Self;
    fn expect_stdout(&self, needle: &str) -> &Self;
    fn expect_stderr(&self, needle: &str) -> &Self;
}

impl OutputExt for Output {
    fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    fn expect_success(&self) -> &Self {
        assert!(
            self.status.success(),
            "esi exited with {:?}\nstderr:\n{}",
            self.status.code(),
            self.stderr_text()
        );
        self
    }

    fn expect_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "esi succeeded unexpectedly\nstdout:\n{}",
            self.stdout_text()
        );
        self
    }

    fn expect_code(&self, code: i32) -> &Self {
        assert_eq!(self.status.code(), Some(code), "stderr:\n{}", self.stderr_text());
        self
    }

    fn expect_stdout(&self, needle: &str) -> &Self {
        let out = self.stdout_text();
        assert!(out.contains(needle), "stdout missing {needle:?}:\n{out}");
        self
    }

    fn expect_stderr(&self, needle: &str) -> &Self {
        let err = self.stderr_text();
        assert!(err.contains(needle), "stderr missing {needle:?}:\n{err}");
        self
    }
}
