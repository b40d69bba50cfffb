//! Remote secret store.
//!
//! A session is opened with the server URL and a bearer token; secrets are
//! addressed by their numeric server-side id plus a field name.
//!
//! ## Adding a New Server Type
//!
//! 1. Implement [`SecretServer`] for the session type
//! 2. Implement [`Connector`] to open sessions from a URL and token
//! 3. Pass the connector to [`crate::core::auth::Authenticator`]

use crate::error::Result;

mod tss;

pub use tss::{TssConnector, TssSession};

/// An open session with a secret store.
pub trait SecretServer {
    /// Fetch the value of `field` within secret `secret_id`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Forbidden` when access is denied,
    /// `RemoteError::FieldMissing` when the secret has no such field, and
    /// other `RemoteError` variants for transport or server failures.
    fn secret_field(&self, secret_id: u64, field: &str) -> Result<String>;
}

/// Opens sessions with a secret store.
pub trait Connector {
    /// Open a session at `url` authenticated with `token`.
    fn connect(&self, url: &str, token: &str) -> Result<Box<dyn SecretServer>>;
}
