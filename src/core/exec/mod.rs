//! Child process construction.
//!
//! Direct mode runs the argument vector as-is. Subshell mode escapes and
//! joins it into a single string and runs `<shell> -c "<string>"`, with the
//! shell taken from `$SHELL`.

use std::ffi::OsString;
use std::process::Command;

use tracing::{debug, warn};

use crate::core::inject::Environment;
use crate::error::{Error, Result};

mod process;

pub use process::{exit_code, run, run_with, SignalForwarder};

/// How the command is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Exec the argument vector directly.
    Direct,
    /// Run the joined arguments through the user's shell.
    Subshell,
}

/// Shell program plus the flag that makes it run a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub program: OsString,
    pub flag: &'static str,
}

impl Shell {
    /// Pick a shell from the value of `$SHELL`.
    pub fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(program) if !program.is_empty() => {
                debug!(shell = ?program, "detected shell from environment");
                Self { program, flag: "-c" }
            }
            _ => {
                let shell = Self::platform_default();
                debug!(shell = ?shell.program, "no shell detected, using default");
                shell
            }
        }
    }

    /// Shell for the current environment.
    pub fn detect() -> Self {
        Self::from_env_value(std::env::var_os("SHELL"))
    }

    #[cfg(windows)]
    fn platform_default() -> Self {
        Self {
            program: "cmd".into(),
            flag: "/C",
        }
    }

    #[cfg(not(windows))]
    fn platform_default() -> Self {
        Self {
            program: "sh".into(),
            flag: "-c",
        }
    }
}

/// Escape backslashes, then double quotes.
#[cfg(not(windows))]
pub fn escape_chars(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape backslashes, then double quotes.
///
/// Without `$SHELL` the command goes to `cmd`, which needs no escaping.
#[cfg(windows)]
pub fn escape_chars(s: &str) -> String {
    if std::env::var_os("SHELL").map_or(true, |s| s.is_empty()) {
        return s.to_string();
    }
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape every argument and join them with single spaces.
pub fn join_escaped<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| escape_chars(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the child command for `args` with exactly the variables in `env`.
///
/// # Errors
///
/// Returns `Error::NoCommand` if `args` is empty.
pub fn build_command(mode: Mode, args: &[String], env: &Environment) -> Result<Command> {
    let (program, rest) = args.split_first().ok_or(Error::NoCommand)?;

    let mut command = match mode {
        Mode::Direct => direct(program, rest),
        Mode::Subshell => {
            let shell = Shell::detect();
            if which::which(&shell.program).is_err() {
                warn!(shell = ?shell.program, "shell not found in PATH, executing command directly");
                direct(program, rest)
            } else {
                let mut command = Command::new(&shell.program);
                command.arg(shell.flag).arg(join_escaped(args));
                command
            }
        }
    };

    command
        .env_clear()
        .envs(env.vars().iter().map(|(k, v)| (k, v)));
    Ok(command)
}

fn direct(program: &str, args: &[String]) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    command
}
