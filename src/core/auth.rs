//! Authentication against the secret server.
//!
//! Combines the credential cache with a [`Connector`]: gather a token, open
//! a session with it, and hold the session for the rest of the invocation.

use tracing::{debug, warn};

use crate::core::credentials::{CredentialManager, Credentials};
use crate::core::prompt::Prompter;
use crate::core::remote::{Connector, SecretServer};
use crate::error::{RemoteError, Result};

/// Owns the open session and any token still waiting to be cached.
pub struct Authenticator<'a> {
    credentials: &'a CredentialManager,
    prompter: &'a dyn Prompter,
    connector: &'a dyn Connector,
    url: String,
    server: Option<Box<dyn SecretServer>>,
    pending: Option<Credentials>,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        credentials: &'a CredentialManager,
        prompter: &'a dyn Prompter,
        connector: &'a dyn Connector,
        url: &str,
    ) -> Self {
        Self {
            credentials,
            prompter,
            connector,
            url: url.to_string(),
            server: None,
            pending: None,
        }
    }

    /// Gather credentials and open a session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Credential errors and connection failures are fatal for the invocation.
    pub fn authenticate(&mut self, force_password: bool, force_token: bool) -> Result<()> {
        let credentials = self
            .credentials
            .gather(self.prompter, force_password, force_token)?;
        let server = self.connector.connect(&self.url, credentials.token())?;
        debug!(
            url = %self.url,
            provisional = credentials.is_provisional(),
            "connected to secret server"
        );

        self.server = Some(server);
        self.pending = if credentials.is_provisional() {
            Some(credentials)
        } else {
            None
        };
        Ok(())
    }

    /// The open session.
    pub fn server(&self) -> Result<&dyn SecretServer> {
        self.server
            .as_deref()
            .ok_or_else(|| RemoteError::NotConnected.into())
    }

    /// Cache a freshly entered token now that it has proven to work.
    pub fn confirm(&mut self) -> Result<()> {
        if let Some(mut credentials) = self.pending.take() {
            if let Err(e) = self.credentials.commit(&mut credentials) {
                warn!(error = %e, "failed to store token");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Whether a token is waiting to be cached.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
