//! Temporary files holding rendered secrets.
//!
//! Files are named `<tmpdir>/esitmp-<uid>-<random><suffix>` and created with
//! owner-only permissions. A crashed invocation can leave files behind, so
//! every creation first sweeps away older files with the same user prefix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::cleanup::Cleanup;
use crate::core::constants::TMPFILE_PREFIX;
use crate::error::Result;

/// File-name prefix shared by every temp file of `uid`.
pub fn prefix(uid: &str) -> String {
    format!("{TMPFILE_PREFIX}-{uid}-")
}

/// Identifier of the invoking user.
#[cfg(unix)]
pub fn current_uid() -> String {
    // SAFETY: getuid has no preconditions and always succeeds.
    unsafe { libc::getuid() }.to_string()
}

/// Identifier of the invoking user.
#[cfg(not(unix))]
pub fn current_uid() -> String {
    whoami::username()
}

/// Delete leftover files in `dir` starting with `prefix`.
///
/// Files registered with `cleanup` belong to this invocation and are kept.
/// Returns the number of files removed.
pub fn purge_stale(dir: &Path, prefix: &str, cleanup: &Cleanup) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to read temp dir");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name();
        if !is_file || !name.to_string_lossy().starts_with(prefix) {
            continue;
        }
        let path = entry.path();
        if cleanup.owns(&path) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed stale temp file");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove stale temp file"),
        }
    }
    removed
}

/// Create a temp file in `dir`, register it with `cleanup`, and write `contents`.
///
/// The file is registered before anything is written, so a failed write
/// still leaves it tracked for removal.
pub fn create(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    contents: &[u8],
    cleanup: &Cleanup,
) -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    let (mut file, path) = file.keep().map_err(|e| e.error)?;
    cleanup.register(path.clone());

    file.write_all(contents)?;
    file.sync_all()?;
    Ok(path)
}
