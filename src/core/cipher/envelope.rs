//! Passphrase envelope: PBKDF2-SHA256 key derivation plus AES-GCM.
//!
//! Wire format is base64 over a JSON object with base64 byte fields:
//!
//! ```text
//! base64({"CipherText":"…","Nonce":"…","Salt":"…"})
//! ```

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};

/// PBKDF2 iteration count.
pub const KDF_ITERATIONS: u32 = 250_000;

/// Random salt length per envelope.
pub const SALT_LENGTH: usize = 8;

/// Derived key length (AES-256).
pub const KEY_LENGTH: usize = 32;

/// GCM nonce length. Non-standard 16 bytes, GHASH-derived counter block.
pub const NONCE_LENGTH: usize = 16;

type Cipher = AesGcm<Aes256, U16>;

/// Sealed payload with everything needed to open it except the passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(with = "b64")]
    pub cipher_text: Vec<u8>,
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` under `passphrase` with a fresh salt and nonce.
    pub fn seal(plaintext: &[u8], passphrase: &[u8]) -> Result<Self> {
        let mut salt = vec![0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = vec![0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);

        let cipher = cipher_for(passphrase, &salt)?;
        let cipher_text = cipher
            .encrypt(Nonce::<U16>::from_slice(&nonce), plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        debug!(len = plaintext.len(), "sealed envelope");
        Ok(Self {
            cipher_text,
            nonce,
            salt,
        })
    }

    /// Decrypt with `passphrase`.
    ///
    /// # Errors
    ///
    /// `CipherError::AuthenticationFailed` when the tag does not verify
    /// (wrong passphrase or tampered bytes), `CipherError::Malformed` when the
    /// nonce has the wrong length.
    pub fn open(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if self.nonce.len() != NONCE_LENGTH {
            return Err(CipherError::Malformed(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LENGTH,
                self.nonce.len()
            ))
            .into());
        }

        let cipher = cipher_for(passphrase, &self.salt)?;
        let plaintext = cipher
            .decrypt(Nonce::<U16>::from_slice(&self.nonce), self.cipher_text.as_slice())
            .map_err(|_| CipherError::AuthenticationFailed)?;
        Ok(Zeroizing::new(plaintext))
    }

    /// Serialize into the opaque base64 token.
    pub fn to_token(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| {
            CipherError::EncryptionFailed(format!("failed to serialize envelope: {}", e))
        })?;
        Ok(BASE64.encode(json))
    }

    /// Parse an opaque base64 token.
    pub fn from_token(token: &[u8]) -> Result<Self> {
        let token = trim_ascii(token);
        let json = BASE64
            .decode(token)
            .map_err(|e| CipherError::Malformed(format!("invalid base64: {}", e)))?;
        serde_json::from_slice(&json)
            .map_err(|e| CipherError::Malformed(format!("invalid envelope: {}", e)).into())
    }
}

/// Derive the AES key for `salt` and build the cipher.
fn cipher_for(passphrase: &[u8], salt: &[u8]) -> Result<Cipher> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, KDF_ITERATIONS, &mut key[..]);
    Cipher::new_from_slice(&key[..])
        .map_err(|e| CipherError::EncryptionFailed(format!("invalid key length: {}", e)).into())
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace() && *b != 0)
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace() && *b != 0)
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
