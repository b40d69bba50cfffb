//! Backend selection for credential storage.
//!
//! The backend is chosen once at startup: the kernel keyring on Linux, or
//! the explicit `Unsupported` variant everywhere else (and on Linux hosts
//! where the keyring cannot be attached).

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{CredentialStore, Scope};
use crate::error::{Result, StoreError};

#[cfg(target_os = "linux")]
use super::KernelKeyring;

/// Credential store with a platform-selected backing.
pub enum Keyring {
    #[cfg(target_os = "linux")]
    Native(KernelKeyring),
    /// No backing keyring. Reads miss, writes fail.
    Unsupported(Scope),
}

/// Open the store for `scope`.
pub fn open(scope: Scope) -> Keyring {
    #[cfg(target_os = "linux")]
    {
        match KernelKeyring::attach(scope) {
            Ok(ring) => {
                debug!(scope = scope.name(), "using kernel keyring");
                return Keyring::Native(ring);
            }
            Err(e) => {
                warn!(scope = scope.name(), error = %e, "failed to attach kernel keyring");
            }
        }
    }

    debug!(scope = scope.name(), "no keyring backend available");
    Keyring::Unsupported(scope)
}

impl Keyring {
    /// Whether a real keyring backs this store.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Keyring::Unsupported(_))
    }

    /// Keyring this store was opened for.
    pub fn scope(&self) -> Scope {
        match self {
            #[cfg(target_os = "linux")]
            Keyring::Native(ring) => ring.scope(),
            Keyring::Unsupported(scope) => *scope,
        }
    }
}

impl CredentialStore for Keyring {
    fn get(&self, id: &str) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            #[cfg(target_os = "linux")]
            Keyring::Native(ring) => ring.get(id),
            Keyring::Unsupported(_) => Err(StoreError::UnsupportedPlatform.into()),
        }
    }

    fn get_and_refresh(&self, id: &str, ttl: u64) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            #[cfg(target_os = "linux")]
            Keyring::Native(ring) => ring.get_and_refresh(id, ttl),
            Keyring::Unsupported(_) => Err(StoreError::UnsupportedPlatform.into()),
        }
    }

    fn store(&self, id: &str, value: &[u8], ttl: u64) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Keyring::Native(ring) => ring.store(id, value, ttl),
            Keyring::Unsupported(_) => Err(StoreError::UnsupportedPlatform.into()),
        }
    }

    fn unlink(&self, id: &str) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Keyring::Native(ring) => ring.unlink(id),
            Keyring::Unsupported(_) => Err(StoreError::UnsupportedPlatform.into()),
        }
    }
}
