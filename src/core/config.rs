//! Configuration file management.
//!
//! Handles locating, reading, and querying the `esi.yml` configuration: the
//! secret server, the catalog of secrets, and the groups of injectors that
//! describe how secrets reach a child process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub secret_server: SecretServerConfig,
    /// Catalog of secrets that injectors may reference by `id`.
    #[serde(default)]
    pub secrets: Vec<SecretRef>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Secret server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretServerConfig {
    #[serde(default)]
    pub url: String,
    /// Lifetime of the cached token in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u64,
}

impl Default for SecretServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ttl: default_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    constants::DEFAULT_TOKEN_TTL
}

/// Catalog entry mapping a local id to a field of a server-side secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub id: String,
    pub secret_id: u64,
    pub field: String,
}

/// Named collection of injectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Preselected entry in the interactive group picker.
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub injectors: Vec<Injector>,
}

/// Named, ordered set of injection rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Injector {
    pub name: String,
    /// Preselected entry in the interactive injector picker.
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub configs: Vec<InjectionRule>,
}

/// One way a secret reaches the child process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InjectionRule {
    #[serde(default)]
    pub env_key: String,
    #[serde(default)]
    pub env_secret: String,

    #[serde(default)]
    pub stdout: bool,
    #[serde(default)]
    pub stdout_secret: String,

    #[serde(default)]
    pub tmp_file: bool,
    #[serde(default)]
    pub tmp_file_secrets: Vec<String>,
    #[serde(default)]
    pub tmp_file_tmpl: String,
    #[serde(default)]
    pub tmp_file_var: String,
    #[serde(default)]
    pub tmp_file_suffix: String,
}

/// The single kind of injection a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Env,
    Stdout,
    File,
    None,
}

impl InjectionRule {
    /// Classify the rule. A file rule wins over stdout, stdout over env.
    pub fn kind(&self) -> RuleKind {
        if self.tmp_file {
            RuleKind::File
        } else if self.stdout && !self.stdout_secret.is_empty() {
            RuleKind::Stdout
        } else if !self.env_key.is_empty() && !self.env_secret.is_empty() {
            RuleKind::Env
        } else {
            RuleKind::None
        }
    }

    /// Secret ids this rule reads, in declaration order.
    pub fn secret_ids(&self) -> Vec<&str> {
        match self.kind() {
            RuleKind::Env => vec![self.env_secret.as_str()],
            RuleKind::Stdout => vec![self.stdout_secret.as_str()],
            RuleKind::File => self.tmp_file_secrets.iter().map(String::as_str).collect(),
            RuleKind::None => Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Otherwise the standard names are
    /// searched in `./`, the user config dir (`esi/`), and `/etc/esi/`; if
    /// none is found an empty configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for a missing explicit path,
    /// `ConfigError::ReadFile` or `ConfigError::Parse` for unreadable files.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()).into());
            }
            let config = Self::from_file(path)?;
            debug!(path = %path.display(), flag = true, "loaded config");
            return Ok(config);
        }

        for dir in Self::search_dirs() {
            for name in constants::CONFIG_FILES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    let config = Self::from_file(&candidate)?;
                    debug!(path = %candidate.display(), flag = false, "loaded config");
                    return Ok(config);
                }
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Directories searched for a config file, in priority order.
    pub fn search_dirs() -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            dirs.push(config_dir.join("esi"));
        }
        dirs.push(PathBuf::from(constants::SYSTEM_CONFIG_DIR));
        dirs
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_yaml(&contents)
    }

    /// Parse config from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents).map_err(ConfigError::Parse)?;
        debug!(
            secrets = config.secrets.len(),
            groups = config.groups.len(),
            "config parsed"
        );
        Ok(config)
    }

    /// Ensure the settings needed to reach the secret server are present.
    pub fn validate(&self) -> Result<()> {
        if self.secret_server.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "secret_server.url",
            }
            .into());
        }
        Ok(())
    }

    /// Find a catalog secret by id (case-insensitive).
    pub fn secret_by_id(&self, id: &str) -> Option<&SecretRef> {
        let found = self.secrets.iter().find(|s| s.id.eq_ignore_ascii_case(id));
        if found.is_none() {
            error!(id = %id, "failed to find secret by id in config");
        }
        found
    }

    /// Injectors of the named group (case-insensitive).
    pub fn injectors_by_group(&self, name: &str) -> Option<&[Injector]> {
        let found = self
            .groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .map(|g| g.injectors.as_slice());
        if found.is_none() {
            error!(name = %name, "failed to find injectors by group name");
        }
        found
    }

    /// Find an injector by its `<group>.<injector>` name (case-insensitive).
    pub fn injector_by_fqdn(&self, fqdn: &str) -> Option<&Injector> {
        let found = self.groups.iter().find_map(|g| {
            let group = fqdn.get(..g.name.len())?;
            let injector = fqdn.get(g.name.len()..)?.strip_prefix('.')?;
            if !group.eq_ignore_ascii_case(&g.name) {
                return None;
            }
            g.injectors
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(injector))
        });
        if found.is_none() {
            error!(fqdn = %fqdn, "failed to find injector by fqdn");
        }
        found
    }
}
