//! Credential storage backed by the OS keyring.
//!
//! Two logically independent stores are used: a session-scoped one that is
//! cleared at logout (the password) and a persistent user-scoped one (the
//! encrypted token). Every stored item carries a TTL after which the backing
//! store forgets it.
//!
//! ## Backends
//!
//! - **Kernel keyring** (Linux): session and user keyrings via keyctl.
//! - **Unsupported** (everything else): every call fails with
//!   `StoreError::UnsupportedPlatform`. Read paths treat that as a miss.

use zeroize::Zeroizing;

use crate::error::Result;

mod backend;
#[cfg(target_os = "linux")]
mod keyutils;

pub use backend::{open, Keyring};
#[cfg(target_os = "linux")]
pub use keyutils::KernelKeyring;

/// Which keyring a store is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Cleared at logout or reboot.
    Session,
    /// Persists for the user across sessions.
    User,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Session => "session",
            Scope::User => "user",
        }
    }
}

/// Credential store trait.
///
/// Items are addressed by a fixed description string such as `esi:token`.
pub trait CredentialStore {
    /// Read an item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the item is absent or expired, or
    /// `StoreError::UnsupportedPlatform` without a backing keyring.
    fn get(&self, id: &str) -> Result<Zeroizing<Vec<u8>>>;

    /// Read an item and extend its expiry to `ttl` seconds from now.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialStore::get`], plus `StoreError::Keyring` if the
    /// timeout cannot be updated.
    fn get_and_refresh(&self, id: &str, ttl: u64) -> Result<Zeroizing<Vec<u8>>>;

    /// Insert or replace an item, expiring after `ttl` seconds.
    fn store(&self, id: &str, value: &[u8], ttl: u64) -> Result<()>;

    /// Remove an item. Removing an absent item is not an error.
    fn unlink(&self, id: &str) -> Result<()>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Box<T> {
    fn get(&self, id: &str) -> Result<Zeroizing<Vec<u8>>> {
        (**self).get(id)
    }

    fn get_and_refresh(&self, id: &str, ttl: u64) -> Result<Zeroizing<Vec<u8>>> {
        (**self).get_and_refresh(id, ttl)
    }

    fn store(&self, id: &str, value: &[u8], ttl: u64) -> Result<()> {
        (**self).store(id, value, ttl)
    }

    fn unlink(&self, id: &str) -> Result<()> {
        (**self).unlink(id)
    }
}
