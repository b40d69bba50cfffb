//! Core library components.
//!
//! Credential caching, secret resolution, injection, and process execution.
//! Nothing in here reads global state: the configuration, stores, prompter,
//! and server connector are passed in explicitly.

pub mod auth;
pub mod cipher;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod exec;
pub mod inject;
pub mod manager;
pub mod prompt;
pub mod remote;
pub mod resolver;
pub mod store;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
