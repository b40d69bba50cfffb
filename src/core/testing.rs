//! In-memory doubles for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use zeroize::Zeroizing;

use crate::core::config::{Group, Injector};
use crate::core::prompt::Prompter;
use crate::core::remote::{Connector, SecretServer};
use crate::core::resolver::{Secret, SecretResolver};
use crate::core::store::CredentialStore;
use crate::error::{Error, RemoteError, Result, StoreError};

#[derive(Default)]
struct StoreState {
    items: HashMap<String, (Vec<u8>, u64)>,
    unlinks: HashMap<String, usize>,
}

/// Keyring stand-in. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<StoreState>>,
    unsupported: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call like a platform without a keyring.
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, id: &str, value: &[u8]) {
        self.state
            .borrow_mut()
            .items
            .insert(id.to_string(), (value.to_vec(), 0));
    }

    pub fn value(&self, id: &str) -> Option<Vec<u8>> {
        self.state.borrow().items.get(id).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, id: &str) -> Option<u64> {
        self.state.borrow().items.get(id).map(|(_, ttl)| *ttl)
    }

    pub fn unlinks(&self, id: &str) -> usize {
        self.state.borrow().unlinks.get(id).copied().unwrap_or(0)
    }

    fn check(&self) -> Result<()> {
        if self.unsupported {
            return Err(StoreError::UnsupportedPlatform.into());
        }
        Ok(())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Zeroizing<Vec<u8>>> {
        self.check()?;
        self.value(id)
            .map(Zeroizing::new)
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    fn get_and_refresh(&self, id: &str, ttl: u64) -> Result<Zeroizing<Vec<u8>>> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let (value, expiry) = state
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *expiry = ttl;
        Ok(Zeroizing::new(value.clone()))
    }

    fn store(&self, id: &str, value: &[u8], ttl: u64) -> Result<()> {
        self.check()?;
        self.state
            .borrow_mut()
            .items
            .insert(id.to_string(), (value.to_vec(), ttl));
        Ok(())
    }

    fn unlink(&self, id: &str) -> Result<()> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.items.remove(id);
        *state.unlinks.entry(id.to_string()).or_default() += 1;
        Ok(())
    }
}

/// Answers prompts from a fixed script; fails once a script runs dry.
#[derive(Default)]
pub struct ScriptedPrompter {
    passwords: RefCell<VecDeque<String>>,
    tokens: RefCell<VecDeque<String>>,
    group: Cell<usize>,
    injector: Cell<usize>,
    passwords_asked: Cell<usize>,
    tokens_asked: Cell<usize>,
    selections: Cell<usize>,
}

impl ScriptedPrompter {
    pub fn new(passwords: &[&str], tokens: &[&str]) -> Self {
        Self {
            passwords: RefCell::new(passwords.iter().map(|s| s.to_string()).collect()),
            tokens: RefCell::new(tokens.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Set the indices returned by the selection prompts.
    pub fn selecting(self, group: usize, injector: usize) -> Self {
        self.group.set(group);
        self.injector.set(injector);
        self
    }

    pub fn passwords_asked(&self) -> usize {
        self.passwords_asked.get()
    }

    pub fn tokens_asked(&self) -> usize {
        self.tokens_asked.get()
    }

    /// Number of group and injector selections made.
    pub fn selections(&self) -> usize {
        self.selections.get()
    }
}

fn next(script: &RefCell<VecDeque<String>>, asked: &Cell<usize>, what: &str) -> Result<Zeroizing<String>> {
    asked.set(asked.get() + 1);
    script
        .borrow_mut()
        .pop_front()
        .map(Zeroizing::new)
        .ok_or_else(|| Error::Prompt(format!("no scripted {what}")))
}

impl Prompter for ScriptedPrompter {
    fn password(&self) -> Result<Zeroizing<String>> {
        next(&self.passwords, &self.passwords_asked, "password")
    }

    fn token(&self) -> Result<Zeroizing<String>> {
        next(&self.tokens, &self.tokens_asked, "token")
    }

    fn select_group(&self, _groups: &[Group]) -> Result<usize> {
        self.selections.set(self.selections.get() + 1);
        Ok(self.group.get())
    }

    fn select_injector(&self, _injectors: &[Injector]) -> Result<usize> {
        self.selections.set(self.selections.get() + 1);
        Ok(self.injector.get())
    }
}

#[derive(Default)]
struct ServerState {
    values: HashMap<(u64, String), String>,
    failures: HashMap<u64, RemoteError>,
    forbidden_tokens: HashSet<String>,
    forbidden_secrets: HashSet<u64>,
    tokens: Vec<String>,
    fetches: HashMap<u64, usize>,
}

/// Secret server stand-in. Sessions share state with their connector.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Rc<RefCell<ServerState>>,
    failing: bool,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every connection attempt fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn set_value(&self, secret_id: u64, field: &str, value: &str) {
        self.state
            .borrow_mut()
            .values
            .insert((secret_id, field.to_string()), value.to_string());
    }

    /// Every fetch of `secret_id` fails with `error`.
    pub fn fail_secret(&self, secret_id: u64, error: RemoteError) {
        self.state.borrow_mut().failures.insert(secret_id, error);
    }

    /// Sessions opened with `token` are refused every fetch.
    pub fn forbid_token(&self, token: &str) {
        self.state
            .borrow_mut()
            .forbidden_tokens
            .insert(token.to_string());
    }

    /// `secret_id` is refused whatever the token.
    pub fn forbid_secret(&self, secret_id: u64) {
        self.state.borrow_mut().forbidden_secrets.insert(secret_id);
    }

    /// Tokens passed to `connect`, in order.
    pub fn tokens(&self) -> Vec<String> {
        self.state.borrow().tokens.clone()
    }

    pub fn fetches(&self, secret_id: u64) -> usize {
        self.state
            .borrow()
            .fetches
            .get(&secret_id)
            .copied()
            .unwrap_or(0)
    }
}

impl Connector for FakeConnector {
    fn connect(&self, url: &str, token: &str) -> Result<Box<dyn SecretServer>> {
        if self.failing {
            return Err(RemoteError::InvalidUrl(url.to_string()).into());
        }
        self.state.borrow_mut().tokens.push(token.to_string());
        Ok(Box::new(FakeSession {
            token: token.to_string(),
            state: Rc::clone(&self.state),
        }))
    }
}

struct FakeSession {
    token: String,
    state: Rc<RefCell<ServerState>>,
}

impl SecretServer for FakeSession {
    fn secret_field(&self, secret_id: u64, field: &str) -> Result<String> {
        let mut state = self.state.borrow_mut();
        *state.fetches.entry(secret_id).or_default() += 1;

        if let Some(error) = state.failures.get(&secret_id) {
            return Err(error.clone().into());
        }
        if state.forbidden_tokens.contains(&self.token)
            || state.forbidden_secrets.contains(&secret_id)
        {
            return Err(RemoteError::Forbidden(format!("403: secret {secret_id}")).into());
        }
        state
            .values
            .get(&(secret_id, field.to_string()))
            .cloned()
            .ok_or_else(|| {
                RemoteError::FieldMissing {
                    secret_id,
                    field: field.to_string(),
                }
                .into()
            })
    }
}

/// A resolver holding already-fetched `(id, value)` pairs.
pub fn resolved(pairs: Vec<(&str, &str)>) -> SecretResolver {
    let mut resolver = SecretResolver::new();
    for (n, (id, value)) in pairs.into_iter().enumerate() {
        let mut secret = Secret::new(id, n as u64 + 1, "password");
        secret.resolve(value.to_string());
        resolver.add(secret);
    }
    resolver
}
