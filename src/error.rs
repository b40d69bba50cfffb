//! Error types.
//!
//! Every fallible operation returns [`Result`], whose error is the top-level
//! [`Error`]. Each subsystem owns a narrower enum that converts into it, so
//! callers can match on the failure classes that drive control flow
//! (a wrong passphrase, a cache miss, a forbidden remote fetch).

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("input failed: {0}")]
    Prompt(String),

    #[error("no required secrets found for injector '{0}'")]
    NoRequiredSecrets(String),

    #[error("no secrets available: max retries exceeded")]
    NoSecrets,

    #[error("no command specified")]
    NoCommand,

    #[error("invalid template: {0}")]
    Template(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and target lookup failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("injector not found: {0}")]
    InjectorNotFound(String),

    #[error("no groups configured")]
    NoGroups,
}

/// Envelope encryption failures.
#[derive(Error, Debug)]
pub enum CipherError {
    /// Wrong passphrase or tampered envelope: the authentication tag did not verify.
    #[error("message authentication failed")]
    AuthenticationFailed,

    /// The token could not be parsed into an envelope.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Credential store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("no keyring available on this platform")]
    UnsupportedPlatform,

    #[error("keyring {op} failed: {reason}")]
    Keyring { op: &'static str, reason: String },
}

/// Remote secret store failures.
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("field '{field}' does not exist on secret {secret_id}")]
    FieldMissing { secret_id: u64, field: String },

    #[error("secret server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("not connected to a secret server")]
    NotConnected,
}

impl Error {
    /// Whether this error is an authorization failure from the secret store.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Error::Remote(RemoteError::Forbidden(_)))
    }

    /// Whether this error is a wrong passphrase or corrupted envelope.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Cipher(CipherError::AuthenticationFailed))
    }
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_classification() {
        let err: Error = RemoteError::Forbidden("403".into()).into();
        assert!(err.is_authorization());

        let err: Error = RemoteError::Http {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(!err.is_authorization());
    }

    #[test]
    fn test_authentication_is_distinct_from_malformed() {
        let auth: Error = CipherError::AuthenticationFailed.into();
        let parse: Error = CipherError::Malformed("bad base64".into()).into();
        assert!(auth.is_authentication());
        assert!(!parse.is_authentication());
    }

    #[test]
    fn test_error_messages() {
        let err: Error = StoreError::NotFound("esi:token".into()).into();
        assert_eq!(err.to_string(), "credential not found: esi:token");

        let err: Error = ConfigError::InjectorNotFound("dev.db".into()).into();
        assert_eq!(err.to_string(), "injector not found: dev.db");
    }
}
