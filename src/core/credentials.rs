//! Credential cache.
//!
//! The local password lives in the session keyring for 15 minutes (refreshed
//! on each use). The API token lives in the user keyring, sealed under that
//! password, for the configured TTL.
//!
//! ```text
//! password:  session store ──miss──▶ prompt ──▶ store (900s)
//! token:     user store ──hit──▶ decrypt ──ok──▶ done
//!                 │                 └─auth failure─▶ unlink password, re-prompt password
//!                 └─miss──▶ prompt ──▶ seal (cached after first successful use)
//! ```

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::cipher;
use crate::core::constants::{PASSWORD_ID, PASSWORD_TTL, TOKEN_ID};
use crate::core::prompt::Prompter;
use crate::core::store::CredentialStore;
use crate::error::{CipherError, Result};

/// Clear-text API token plus its pending cache entry.
pub struct Credentials {
    token: Zeroizing<String>,
    /// Sealed token not yet written to the user store.
    provisional: Option<String>,
}

impl Credentials {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the token was freshly entered and is not cached yet.
    pub fn is_provisional(&self) -> bool {
        self.provisional.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("provisional", &self.is_provisional())
            .finish()
    }
}

/// Keeps the password and token stores consistent.
pub struct CredentialManager {
    session: Box<dyn CredentialStore>,
    user: Box<dyn CredentialStore>,
    token_ttl: u64,
}

impl CredentialManager {
    /// Create a manager over the session store (password) and user store (token).
    pub fn new(
        session: Box<dyn CredentialStore>,
        user: Box<dyn CredentialStore>,
        token_ttl: u64,
    ) -> Self {
        Self {
            session,
            user,
            token_ttl,
        }
    }

    /// Obtain the clear-text token, prompting where the cache cannot help.
    ///
    /// A cached token that fails to decrypt with the cached password means
    /// the password is stale: it is unlinked and the user is asked again.
    /// Each retry waits on a fresh human answer, so the loop ends when the
    /// user supplies the right password or cancels the prompt.
    ///
    /// # Errors
    ///
    /// Propagates prompt failures, required keyring writes, and envelope
    /// errors other than an authentication failure.
    pub fn gather(
        &self,
        prompter: &dyn Prompter,
        force_password: bool,
        force_token: bool,
    ) -> Result<Credentials> {
        let mut force_password = force_password;
        loop {
            let password = self.password(prompter, force_password)?;

            if force_token {
                return self.fresh_token(prompter, &password);
            }

            let sealed = match self.user.get(TOKEN_ID) {
                Ok(sealed) if !sealed.is_empty() => sealed,
                Ok(_) => return self.fresh_token(prompter, &password),
                Err(e) => {
                    warn!(error = %e, "failed to get token from keyring");
                    return self.fresh_token(prompter, &password);
                }
            };

            match cipher::decrypt(&sealed, password.as_bytes()) {
                Ok(plain) => {
                    let token = String::from_utf8(plain.to_vec())
                        .map_err(|_| CipherError::Malformed("token is not utf-8".into()))?;
                    debug!("decrypted cached token");
                    return Ok(Credentials {
                        token: Zeroizing::new(token),
                        provisional: None,
                    });
                }
                Err(e) if e.is_authentication() => {
                    warn!("failed to decrypt token: wrong password, will retry");
                    if let Err(e) = self.session.unlink(PASSWORD_ID) {
                        warn!(error = %e, "failed to unlink faulty password");
                    }
                    force_password = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Write a provisional token to the user store.
    ///
    /// Call once the token has been used successfully. Does nothing for
    /// tokens that came from the cache.
    pub fn commit(&self, credentials: &mut Credentials) -> Result<()> {
        if let Some(sealed) = credentials.provisional.take() {
            if let Err(e) = self.user.store(TOKEN_ID, sealed.as_bytes(), self.token_ttl) {
                credentials.provisional = Some(sealed);
                return Err(e);
            }
            info!(ttl = self.token_ttl, "cached token in keyring");
        }
        Ok(())
    }

    fn password(&self, prompter: &dyn Prompter, force: bool) -> Result<Zeroizing<String>> {
        if !force {
            match self.session.get_and_refresh(PASSWORD_ID, PASSWORD_TTL) {
                Ok(bytes) if !bytes.is_empty() => match String::from_utf8(bytes.to_vec()) {
                    Ok(password) => return Ok(Zeroizing::new(password)),
                    Err(_) => warn!("cached password is not valid utf-8"),
                },
                Ok(_) => debug!("cached password is empty"),
                Err(e) => warn!(error = %e, "failed to get password from keyring"),
            }
        }

        let password = prompter.password()?;
        self.session
            .store(PASSWORD_ID, password.as_bytes(), PASSWORD_TTL)?;
        Ok(password)
    }

    fn fresh_token(&self, prompter: &dyn Prompter, password: &str) -> Result<Credentials> {
        let token = prompter.token()?;
        let sealed = cipher::encrypt(token.as_bytes(), password.as_bytes())?;
        Ok(Credentials {
            token,
            provisional: Some(sealed),
        })
    }
}
