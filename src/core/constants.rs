//! Constants used throughout esi.
//!
//! Centralizes magic strings and configuration values.

/// Session keyring entry holding the local encryption password.
pub const PASSWORD_ID: &str = "esi:password";

/// User keyring entry holding the encrypted API token.
pub const TOKEN_ID: &str = "esi:token";

/// Lifetime of the cached password in seconds (15 minutes).
pub const PASSWORD_TTL: u64 = 900;

/// Default lifetime of the cached token in seconds.
pub const DEFAULT_TOKEN_TTL: u64 = 7200;

/// Config file names searched in each config directory, in order.
pub const CONFIG_FILES: &[&str] = &[".esi.yml", "esi.yml", ".esi.yaml", "esi.yaml"];

/// System-wide config directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/esi";

/// Workspace file naming the injector for a directory tree.
pub const WORKSPACE_FILE: &str = ".esi-workspace.yml";

/// Prefix of generated temporary files (`esitmp-<uid>-<random>`).
pub const TMPFILE_PREFIX: &str = "esitmp";

/// Outer fetch attempts before giving up on the secret set.
pub const MAX_FETCH_ATTEMPTS: usize = 3;

/// Exit status used when no child process was spawned.
pub const FAILURE_EXIT_CODE: i32 = 1;
