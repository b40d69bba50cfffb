//! Secret injection.
//!
//! Applies an injector's rules, in declared order, to the child process
//! environment, a stdout buffer, and rendered temp files.
//!
//! | Rule   | Effect                                               |
//! |--------|------------------------------------------------------|
//! | env    | `KEY=value` appended to the child environment        |
//! | stdout | value appended to the stdout buffer                  |
//! | file   | template rendered to a temp file, path exported      |
//!
//! Rules whose secret is unresolved or empty are skipped.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::cleanup::Cleanup;
use crate::core::config::{InjectionRule, Injector, RuleKind};
use crate::core::resolver::SecretResolver;
use crate::error::Result;

pub mod template;
pub mod tmpfile;

/// Separator between consecutive stdout values.
const STDOUT_SEPARATOR: &str = "\n\n";

/// Environment handed to the child process.
///
/// Entries are kept in insertion order; a later entry for the same key wins.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Start from a copy of this process's environment.
    pub fn inherit() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.push((key.into(), value.into()));
    }

    /// Effective value of `key`.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn vars(&self) -> &[(OsString, OsString)] {
        &self.vars
    }
}

/// Result of applying an injector.
#[derive(Debug)]
pub struct Injection {
    pub env: Environment,
    stdout: Zeroizing<String>,
    /// Temp files created, in rule order.
    pub files: Vec<PathBuf>,
}

impl Injection {
    /// The accumulated stdout values.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Write the stdout buffer, if any, in a single write.
    pub fn write_stdout(&self, out: &mut impl Write) -> io::Result<()> {
        if self.stdout.is_empty() {
            return Ok(());
        }
        out.write_all(self.stdout.as_bytes())?;
        out.flush()
    }
}

/// Applies injection rules using fetched secrets.
pub struct InjectionEngine<'a> {
    resolver: &'a SecretResolver,
    cleanup: &'a Cleanup,
    temp_dir: PathBuf,
    uid: String,
}

impl<'a> InjectionEngine<'a> {
    pub fn new(resolver: &'a SecretResolver, cleanup: &'a Cleanup) -> Self {
        Self {
            resolver,
            cleanup,
            temp_dir: std::env::temp_dir(),
            uid: tmpfile::current_uid(),
        }
    }

    /// Create temp files in `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        self.temp_dir = dir.to_path_buf();
        self
    }

    /// Apply every rule of `injector` on top of `env`.
    ///
    /// A file rule that cannot be written is logged and skipped; the file,
    /// if it was created, stays registered for cleanup.
    pub fn apply(&self, injector: &Injector, mut env: Environment) -> Injection {
        let mut stdout = Zeroizing::new(String::new());
        let mut files = Vec::new();

        for rule in &injector.configs {
            match rule.kind() {
                RuleKind::Env => {
                    if let Some(value) = self.value(&rule.env_secret) {
                        env.push(&rule.env_key, value);
                        debug!(key = %rule.env_key, "set environment variable");
                    }
                }
                RuleKind::Stdout => {
                    if let Some(value) = self.value(&rule.stdout_secret) {
                        if !stdout.is_empty() {
                            stdout.push_str(STDOUT_SEPARATOR);
                        }
                        stdout.push_str(value);
                    }
                }
                RuleKind::File => match self.write_file(rule) {
                    Ok(path) => {
                        debug!(path = %path.display(), var = %rule.tmp_file_var, "created temp file");
                        if !rule.tmp_file_var.is_empty() {
                            env.push(&rule.tmp_file_var, path.as_os_str());
                        }
                        files.push(path);
                    }
                    Err(e) => warn!(error = %e, "failed to create temp file"),
                },
                RuleKind::None => debug!("skipping rule without an injection target"),
            }
        }

        Injection { env, stdout, files }
    }

    fn value(&self, id: &str) -> Option<&'a str> {
        match self.resolver.get(id) {
            Some(secret) if !secret.value().is_empty() => Some(secret.value()),
            Some(_) => {
                debug!(id = %id, "secret has no value");
                None
            }
            None => {
                debug!(id = %id, "unable to find secret by id");
                None
            }
        }
    }

    fn write_file(&self, rule: &InjectionRule) -> Result<PathBuf> {
        let mut values = template::Values::new();
        for id in &rule.tmp_file_secrets {
            if let Some(secret) = self.resolver.get(id) {
                values.insert(id, secret.value());
            }
        }
        let rendered = Zeroizing::new(template::render(&rule.tmp_file_tmpl, &values)?);

        let prefix = tmpfile::prefix(&self.uid);
        tmpfile::purge_stale(&self.temp_dir, &prefix, self.cleanup);
        tmpfile::create(
            &self.temp_dir,
            &prefix,
            &rule.tmp_file_suffix,
            rendered.as_bytes(),
            self.cleanup,
        )
    }
}
