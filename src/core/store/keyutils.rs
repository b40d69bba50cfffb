//! Linux kernel keyring backend.
//!
//! Items are `user`-type keys linked into the session or user keyring.
//! Expiry is handled by the kernel through key timeouts.

#![cfg(target_os = "linux")]

use linux_keyutils::{Key, KeyError, KeyRing, KeyRingIdentifier};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{CredentialStore, Scope};
use crate::error::{Result, StoreError};

/// Initial read buffer. Keys larger than this are re-read at full size.
const READ_BUFFER: usize = 4096;

/// Kernel keyring attached to a special keyring id.
pub struct KernelKeyring {
    ring: KeyRing,
    scope: Scope,
}

impl KernelKeyring {
    /// Attach to the session or user keyring of the calling process.
    pub fn attach(scope: Scope) -> Result<Self> {
        let id = match scope {
            Scope::Session => KeyRingIdentifier::Session,
            Scope::User => KeyRingIdentifier::User,
        };
        let ring = KeyRing::from_special_id(id, false).map_err(|e| StoreError::Keyring {
            op: "attach",
            reason: e.to_string(),
        })?;
        Ok(Self { ring, scope })
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn search(&self, id: &str) -> Result<Key> {
        self.ring.search(id).map_err(|e| {
            debug!(scope = self.scope.name(), id = %id, error = %e, "keyring search missed");
            StoreError::NotFound(id.to_string()).into()
        })
    }

    fn read(&self, id: &str, key: &Key) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(vec![0u8; READ_BUFFER]);
        let mut len = key.read(&mut *buf).map_err(|e| read_error(id, e))?;
        if len > buf.len() {
            buf.resize(len, 0);
            len = key.read(&mut *buf).map_err(|e| read_error(id, e))?;
        }
        buf.truncate(len);
        Ok(buf)
    }
}

fn read_error(id: &str, e: KeyError) -> crate::error::Error {
    debug!(id = %id, error = %e, "failed to read key");
    StoreError::NotFound(id.to_string()).into()
}

impl CredentialStore for KernelKeyring {
    fn get(&self, id: &str) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.search(id)?;
        self.read(id, &key)
    }

    fn get_and_refresh(&self, id: &str, ttl: u64) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.search(id)?;
        let data = self.read(id, &key)?;
        key.set_timeout(ttl as usize)
            .map_err(|e| StoreError::Keyring {
                op: "refresh ttl",
                reason: e.to_string(),
            })?;
        debug!(scope = self.scope.name(), id = %id, ttl, "refreshed key ttl");
        Ok(data)
    }

    fn store(&self, id: &str, value: &[u8], ttl: u64) -> Result<()> {
        let key = self
            .ring
            .add_key(id, value)
            .map_err(|e| StoreError::Keyring {
                op: "store",
                reason: e.to_string(),
            })?;
        if let Err(e) = key.set_timeout(ttl as usize) {
            warn!(scope = self.scope.name(), id = %id, error = %e, "failed to set key ttl");
        }
        debug!(scope = self.scope.name(), id = %id, ttl, "stored key");
        Ok(())
    }

    fn unlink(&self, id: &str) -> Result<()> {
        let key = match self.ring.search(id) {
            Ok(key) => key,
            Err(KeyError::KeyDoesNotExist) => return Ok(()),
            Err(e) => {
                return Err(StoreError::Keyring {
                    op: "unlink",
                    reason: e.to_string(),
                }
                .into())
            }
        };
        self.ring.unlink_key(key).map_err(|e| StoreError::Keyring {
            op: "unlink",
            reason: e.to_string(),
        })?;
        debug!(scope = self.scope.name(), id = %id, "unlinked key");
        Ok(())
    }
}
