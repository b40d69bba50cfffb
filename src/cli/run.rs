//! Run command.
//!
//! Loads the config, picks the injector from `--injector` or the workspace
//! file, and hands everything to the execution manager.

use std::path::Path;

use tracing::debug;

use crate::core::config::{Config, Injector};
use crate::core::credentials::CredentialManager;
use crate::core::exec::Mode;
use crate::core::manager::ExecutionManager;
use crate::core::prompt::Terminal;
use crate::core::remote::TssConnector;
use crate::core::store::{self, Scope};
use crate::core::workspace::Workspace;
use crate::error::{Error, Result};

/// Run `args` with secrets injected and return the child's exit code.
pub fn execute(
    mode: Mode,
    config: Option<&Path>,
    injector: Option<&str>,
    args: &[String],
) -> Result<i32> {
    if args.is_empty() {
        return Err(Error::NoCommand);
    }

    let config = Config::load(config)?;
    let credentials = credentials(&config);
    let target = target(&config, injector);

    let prompter = Terminal;
    let connector = TssConnector;
    let mut manager = ExecutionManager::new(&config, &credentials, &prompter, &connector);
    if let Some(injector) = target {
        manager = manager.with_injector(injector);
    }
    manager.run(mode, args)
}

/// Credential cache over the session and user keyrings.
pub fn credentials(config: &Config) -> CredentialManager {
    CredentialManager::new(
        Box::new(store::open(Scope::Session)),
        Box::new(store::open(Scope::User)),
        config.secret_server.ttl,
    )
}

/// Resolve the preselected injector.
///
/// An explicit `--injector` wins over the workspace file. A name that does
/// not match is logged and the user is asked to choose instead.
fn target<'a>(config: &'a Config, flag: Option<&str>) -> Option<&'a Injector> {
    if let Some(fqdn) = flag {
        let found = config.injector_by_fqdn(fqdn);
        if found.is_some() {
            debug!(fqdn = %fqdn, "loaded injector from flag");
        }
        return found;
    }

    let workspace = Workspace::discover()?;
    let found = config.injector_by_fqdn(&workspace.injector);
    if found.is_some() {
        debug!(fqdn = %workspace.injector, "loaded injector from workspace file");
    }
    found
}
