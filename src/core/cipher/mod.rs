//! Cryptographic operations.
//!
//! The credential cache keeps the API token sealed under the user's local
//! password. [`encrypt`] and [`decrypt`] work on the opaque token form that
//! is written to the keyring; [`Envelope`] exposes the structured form.

mod envelope;

pub use envelope::{Envelope, KDF_ITERATIONS, KEY_LENGTH, NONCE_LENGTH, SALT_LENGTH};

use zeroize::Zeroizing;

use crate::error::Result;

/// Encrypt `plaintext` under `passphrase` and return the envelope token.
///
/// Every call draws a fresh salt and nonce, so two calls with the same
/// inputs never produce the same token.
///
/// # Errors
///
/// Returns `CipherError::EncryptionFailed` if the cipher cannot be built or
/// the envelope cannot be serialized.
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<String> {
    Envelope::seal(plaintext, passphrase)?.to_token()
}

/// Decrypt an envelope token produced by [`encrypt`].
///
/// # Errors
///
/// Returns `CipherError::AuthenticationFailed` for a wrong passphrase or a
/// tampered token, and `CipherError::Malformed` if the token does not parse.
pub fn decrypt(token: &[u8], passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    Envelope::from_token(token)?.open(passphrase)
}
