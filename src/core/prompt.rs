//! Interactive input.
//!
//! The credential flow and target selection only need a handful of
//! synchronous questions. [`Prompter`] abstracts them so the flows can be
//! driven by scripted answers in tests; [`Terminal`] asks with dialoguer.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Password, Select};
use zeroize::Zeroizing;

use crate::core::config::{Group, Injector};
use crate::error::Result;

/// Source of interactive answers.
pub trait Prompter {
    /// Ask for the local encryption password.
    fn password(&self) -> Result<Zeroizing<String>>;

    /// Ask for the secret server API token.
    fn token(&self) -> Result<Zeroizing<String>>;

    /// Pick a group; returns its index.
    fn select_group(&self, groups: &[Group]) -> Result<usize>;

    /// Pick an injector; returns its index.
    fn select_injector(&self, injectors: &[Injector]) -> Result<usize>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct Terminal;

impl Prompter for Terminal {
    fn password(&self) -> Result<Zeroizing<String>> {
        let value = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Local encryption password")
            .interact()?;
        Ok(Zeroizing::new(value))
    }

    fn token(&self) -> Result<Zeroizing<String>> {
        let value = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("TSS API Token")
            .interact()?;
        Ok(Zeroizing::new(value))
    }

    fn select_group(&self, groups: &[Group]) -> Result<usize> {
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        let default = groups.iter().position(|g| g.selected).unwrap_or(0);
        select("Select Group", &names, default)
    }

    fn select_injector(&self, injectors: &[Injector]) -> Result<usize> {
        let names: Vec<&str> = injectors.iter().map(|i| i.name.as_str()).collect();
        let default = injectors.iter().position(|i| i.selected).unwrap_or(0);
        select("Select Injector", &names, default)
    }
}

fn select(title: &str, items: &[&str], default: usize) -> Result<usize> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(title)
        .items(items)
        .default(default)
        .interact()?)
}
