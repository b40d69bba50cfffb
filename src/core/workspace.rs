//! Workspace file discovery.
//!
//! A `.esi-workspace.yml` in the current directory or any parent names the
//! injector to use when `--injector` is not given:
//!
//! ```yaml
//! injector: dev.backend
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Parsed workspace file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub injector: String,
}

impl Workspace {
    /// Find and load the nearest workspace file above the current directory.
    ///
    /// A missing file yields `None`; an unreadable or malformed file is
    /// logged and also yields `None`.
    pub fn discover() -> Option<Self> {
        let cwd = std::env::current_dir().ok()?;
        let path = find_upwards(&cwd)?;
        match Self::load(&path) {
            Ok(ws) => Some(ws),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load workspace config");
                None
            }
        }
    }

    /// Load a workspace file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Ok(serde_yaml::from_str(&contents).map_err(ConfigError::Parse)?)
    }
}

/// Walk from `start` to the filesystem root looking for the workspace file.
pub fn find_upwards(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let path = dir.join(constants::WORKSPACE_FILE);
        if path.is_file() {
            debug!(path = %path.display(), "found workspace config");
            return Some(path);
        }
    }
    None
}
