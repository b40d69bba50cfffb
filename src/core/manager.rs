//! Invocation state machine.
//!
//! ```text
//! Idle → Authenticating → SelectingTarget → ResolvingSecrets
//!      → Injecting → Executing → CleaningUp → Done
//! ```
//!
//! Any failure before `Executing` aborts without spawning a process. Temp
//! files created during `Injecting` are removed exactly once, by whichever
//! of the signal thread, the normal exit path, or an early return gets
//! there first.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::auth::Authenticator;
use crate::core::cleanup::Cleanup;
use crate::core::config::{Config, Injector};
use crate::core::credentials::CredentialManager;
use crate::core::exec::{self, Mode, SignalForwarder};
use crate::core::inject::{Environment, InjectionEngine};
use crate::core::prompt::Prompter;
use crate::core::remote::Connector;
use crate::core::resolver::{required_secrets, SecretResolver};
use crate::error::{ConfigError, Error, Result};

/// Stage of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Authenticating,
    SelectingTarget,
    ResolvingSecrets,
    Injecting,
    Executing,
    CleaningUp,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Authenticating => "authenticating",
            Stage::SelectingTarget => "selecting target",
            Stage::ResolvingSecrets => "resolving secrets",
            Stage::Injecting => "injecting",
            Stage::Executing => "executing",
            Stage::CleaningUp => "cleaning up",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives one invocation from authentication to the child's exit.
pub struct ExecutionManager<'a> {
    config: &'a Config,
    credentials: &'a CredentialManager,
    prompter: &'a dyn Prompter,
    connector: &'a dyn Connector,
    injector: Option<&'a Injector>,
    env: Option<Environment>,
    temp_dir: Option<PathBuf>,
    output: Option<Box<dyn Write + 'a>>,
    stage: Stage,
}

impl<'a> ExecutionManager<'a> {
    pub fn new(
        config: &'a Config,
        credentials: &'a CredentialManager,
        prompter: &'a dyn Prompter,
        connector: &'a dyn Connector,
    ) -> Self {
        Self {
            config,
            credentials,
            prompter,
            connector,
            injector: None,
            env: None,
            temp_dir: None,
            output: None,
            stage: Stage::Idle,
        }
    }

    /// Use `injector` instead of asking the user to pick one.
    pub fn with_injector(mut self, injector: &'a Injector) -> Self {
        self.injector = Some(injector);
        self
    }

    /// Base environment for the child (defaults to this process's).
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Directory for temp files (defaults to the system temp dir).
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        self.temp_dir = Some(dir.to_path_buf());
        self
    }

    /// Destination for stdout rules (defaults to standard output).
    pub fn with_output(mut self, output: Box<dyn Write + 'a>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }

    /// Run `args` with the selected injector's secrets and return the
    /// child's exit code.
    ///
    /// # Errors
    ///
    /// Any failure before the child is spawned, including an empty `args`.
    pub fn run(&mut self, mode: Mode, args: &[String]) -> Result<i32> {
        if args.is_empty() {
            return Err(Error::NoCommand);
        }
        self.config.validate()?;

        self.enter(Stage::Authenticating);
        let config = self.config;
        let mut auth = Authenticator::new(
            self.credentials,
            self.prompter,
            self.connector,
            &config.secret_server.url,
        );
        auth.authenticate(false, false)?;

        self.enter(Stage::SelectingTarget);
        let injector = match self.injector {
            Some(injector) => injector,
            None => self.select_target()?,
        };
        debug!(injector = %injector.name, "selected injector");

        self.enter(Stage::ResolvingSecrets);
        let required = required_secrets(config, injector);
        if required.is_empty() {
            return Err(Error::NoRequiredSecrets(injector.name.clone()));
        }
        let mut resolver = SecretResolver::new();
        resolver.fetch_all(&mut auth, required)?;

        self.enter(Stage::Injecting);
        let cleanup = Cleanup::new();
        let guard = cleanup.guard();
        let signals = SignalForwarder::install(&cleanup)?;
        let mut engine = InjectionEngine::new(&resolver, &cleanup);
        if let Some(dir) = &self.temp_dir {
            engine = engine.with_temp_dir(dir);
        }
        let base = self.env.take().unwrap_or_else(Environment::inherit);
        let injection = engine.apply(injector, base);
        match self.output.as_mut() {
            Some(out) => injection.write_stdout(out)?,
            None => injection.write_stdout(&mut io::stdout().lock())?,
        }
        let command = exec::build_command(mode, args, &injection.env)?;

        self.enter(Stage::Executing);
        let code = exec::run_with(command, &signals)?;

        self.enter(Stage::CleaningUp);
        drop(signals);
        drop(guard);

        self.enter(Stage::Done);
        Ok(code)
    }

    fn select_target(&self) -> Result<&'a Injector> {
        let config: &'a Config = self.config;
        let groups = &config.groups;
        if groups.is_empty() {
            return Err(ConfigError::NoGroups.into());
        }
        let group = groups
            .get(self.prompter.select_group(groups)?)
            .ok_or(ConfigError::NoGroups)?;

        let injectors = &group.injectors;
        if injectors.is_empty() {
            return Err(ConfigError::InjectorNotFound(group.name.clone()).into());
        }
        injectors
            .get(self.prompter.select_injector(injectors)?)
            .ok_or_else(|| ConfigError::InjectorNotFound(group.name.clone()).into())
    }
}
