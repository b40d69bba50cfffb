//! Login command.
//!
//! Authenticates against the secret server and caches the credentials
//! without fetching secrets or running anything.

use std::path::Path;

use crate::cli::{output, run};
use crate::core::auth::Authenticator;
use crate::core::config::Config;
use crate::core::prompt::Terminal;
use crate::core::remote::TssConnector;
use crate::error::Result;

/// Authenticate, re-prompting for both password and token with `force`.
pub fn execute(config: Option<&Path>, force: bool) -> Result<()> {
    let config = Config::load(config)?;
    config.validate()?;

    let credentials = run::credentials(&config);
    let prompter = Terminal;
    let connector = TssConnector;

    let mut auth = Authenticator::new(
        &credentials,
        &prompter,
        &connector,
        &config.secret_server.url,
    );
    auth.authenticate(force, force)?;
    // Nothing is fetched here, so the token is cached without a test request.
    auth.confirm()?;

    output::success("credentials cached");
    Ok(())
}
