//! Secret resolution.
//!
//! Collects the secrets an injector needs from the catalog and fetches their
//! values from the secret server.

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::auth::Authenticator;
use crate::core::config::{Config, Injector};
use crate::core::constants::MAX_FETCH_ATTEMPTS;
use crate::error::{Error, Result};

/// A catalog secret and, once fetched, its value.
pub struct Secret {
    pub id: String,
    pub secret_id: u64,
    pub field: String,
    value: Option<Zeroizing<String>>,
}

impl Secret {
    pub fn new(id: &str, secret_id: u64, field: &str) -> Self {
        Self {
            id: id.to_string(),
            secret_id,
            field: field.to_string(),
            value: None,
        }
    }

    /// The fetched value, or an empty string if unresolved.
    pub fn value(&self) -> &str {
        self.value.as_deref().map_or("", |v| v.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn resolve(&mut self, value: String) {
        self.value = Some(Zeroizing::new(value));
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("secret_id", &self.secret_id)
            .field("field", &self.field)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Distinct catalog secrets referenced by `injector`, in first-use order.
///
/// Unknown ids are logged and skipped.
pub fn required_secrets(config: &Config, injector: &Injector) -> Vec<Secret> {
    let mut required: Vec<Secret> = Vec::new();
    for rule in &injector.configs {
        for id in rule.secret_ids() {
            if id.is_empty() || required.iter().any(|s| s.id.eq_ignore_ascii_case(id)) {
                continue;
            }
            if let Some(entry) = config.secret_by_id(id) {
                required.push(Secret::new(&entry.id, entry.secret_id, &entry.field));
            }
        }
    }
    debug!(injector = %injector.name, count = required.len(), "collected required secrets");
    required
}

/// Holds the fetched secrets for lookup during injection.
#[derive(Debug, Default)]
pub struct SecretResolver {
    secrets: Vec<Secret>,
}

impl SecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every secret's value and keep the set for [`SecretResolver::get`].
    ///
    /// Up to three passes are made over the unresolved secrets. An
    /// authorization failure triggers one re-authentication with a fresh
    /// token (the cached password is kept) and one retry of that secret;
    /// if the retry is refused too, the secret is skipped for this pass.
    /// Any other failure aborts immediately. Passes stop once at least one
    /// secret is resolved.
    ///
    /// # Errors
    ///
    /// Returns the first non-authorization fetch error, or `Error::NoSecrets`
    /// if nothing could be fetched.
    pub fn fetch_all(&mut self, auth: &mut Authenticator<'_>, mut secrets: Vec<Secret>) -> Result<usize> {
        let mut fetched = 0;
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            for secret in secrets.iter_mut().filter(|s| !s.is_resolved()) {
                match fetch(auth, secret) {
                    Ok(()) => {}
                    Err(e) if e.is_authorization() => {
                        warn!(
                            id = %secret.id,
                            secret_id = secret.secret_id,
                            field = %secret.field,
                            error = %e,
                            "failed to fetch secret, re-authenticating"
                        );
                        if let Err(e) = auth.authenticate(false, true) {
                            warn!(error = %e, "authentication failed");
                        }
                        match fetch(auth, secret) {
                            Ok(()) => {}
                            Err(e) if e.is_authorization() => {
                                warn!(id = %secret.id, error = %e, "giving up on secret");
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    Err(e) => return Err(e),
                }
            }

            fetched = secrets.iter().filter(|s| s.is_resolved()).count();
            if fetched > 0 {
                break;
            }
            warn!(attempt, max = MAX_FETCH_ATTEMPTS, "no secrets fetched");
        }

        if fetched == 0 {
            return Err(Error::NoSecrets);
        }

        debug!(fetched, total = secrets.len(), "fetched secrets");
        self.secrets = secrets;
        Ok(fetched)
    }

    /// Look up a fetched secret by id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    /// All secrets handed to the last [`SecretResolver::fetch_all`].
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    #[cfg(test)]
    pub(crate) fn add(&mut self, secret: Secret) {
        self.secrets.push(secret);
    }
}

fn fetch(auth: &mut Authenticator<'_>, secret: &mut Secret) -> Result<()> {
    let value = auth.server()?.secret_field(secret.secret_id, &secret.field)?;
    secret.resolve(value);
    if let Err(e) = auth.confirm() {
        warn!(error = %e, "token works but could not be cached");
    }
    Ok(())
}
