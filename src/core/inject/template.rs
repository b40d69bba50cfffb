//! Placeholder rendering for temp-file templates.
//!
//! Placeholders take the form `{{ .id }}` or `{{ .id.Value }}`, optionally
//! scoped as `{{ .Secrets.id }}` / `{{ .Secrets.id.Value }}`. Ids are
//! matched case-insensitively; unknown ids render as an empty string.
//! Any other `{{ ... }}` action is left in place and logged. Everything
//! outside a placeholder is copied verbatim.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::error::{Error, Result};

/// Any `{{ ... }}` action.
const ACTION: &str = r"\{\{(.*?)\}\}";

/// Body of an action that names a secret.
const SECRET_REF: &str = r"^\s*\.(?:Secrets\.)?([A-Za-z0-9_\-]+)(?:\.Value)?\s*$";

static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();

fn patterns() -> Result<&'static (Regex, Regex)> {
    if let Some(p) = PATTERNS.get() {
        return Ok(p);
    }
    let compile = |re: &str| Regex::new(re).map_err(|e| Error::Template(e.to_string()));
    let p = (compile(ACTION)?, compile(SECRET_REF)?);
    Ok(PATTERNS.get_or_init(|| p))
}

/// Values available to a template, keyed by lowercase id.
#[derive(Default)]
pub struct Values<'a> {
    values: HashMap<String, &'a str>,
}

impl<'a> Values<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, value: &'a str) {
        self.values.insert(id.to_ascii_lowercase(), value);
    }

    fn get(&self, id: &str) -> &'a str {
        self.values
            .get(&id.to_ascii_lowercase())
            .copied()
            .unwrap_or("")
    }
}

/// Substitute every placeholder in `template`.
pub fn render(template: &str, values: &Values<'_>) -> Result<String> {
    let (action, secret_ref) = patterns()?;
    let rendered = action.replace_all(template, |caps: &Captures<'_>| {
        let body = caps.get(1).map_or("", |m| m.as_str());
        match secret_ref.captures(body).and_then(|c| c.get(1)) {
            Some(id) => values.get(id.as_str()).to_string(),
            None => {
                warn!(action = %body.trim(), "unsupported template action left as-is");
                caps[0].to_string()
            }
        }
    });
    Ok(rendered.into_owned())
}
