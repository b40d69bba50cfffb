//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an esi command isolated from the user's environment.
    ///
    /// - HOME and the XDG config dir point at the temporary home
    /// - ESI_CONFIG and ESI_LOG are cleared
    /// - the working directory is the test dir
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("esi").expect("failed to find esi binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("ESI_CONFIG");
        cmd.env_remove("ESI_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `esi -- <args>`.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("--")
            .args(args)
            .output()
            .expect("failed to run esi")
    }

    /// Shortcut for `esi --config <path> -- <args>`.
    pub fn run_with_config(&self, config: &str, args: &[&str]) -> Output {
        self.cmd()
            .args(["--config", config, "--"])
            .args(args)
            .output()
            .expect("failed to run esi")
    }

    /// Shortcut for `esi version`.
    pub fn version(&self) -> Output {
        self.cmd()
            .arg("version")
            .output()
            .expect("failed to run esi version")
    }

    /// Shortcut for `esi completions <shell>`.
    pub fn completions(&self, shell: &str) -> Output {
        self.cmd()
            .args(["completions", shell])
            .output()
            .expect("failed to run esi completions")
    }
}
