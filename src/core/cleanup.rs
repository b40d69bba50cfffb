//! One-shot removal of temporary artifacts.
//!
//! The same [`Cleanup`] is shared by the main thread, which runs it after the
//! child exits, and the signal thread, which runs it before forwarding a
//! terminating signal. Whichever gets there first does the work.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct State {
    artifacts: Vec<PathBuf>,
    done: bool,
}

/// Registry of files to delete when the invocation ends.
#[derive(Debug, Clone, Default)]
pub struct Cleanup {
    state: Arc<Mutex<State>>,
}

impl Cleanup {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `path` for removal.
    pub fn register(&self, path: PathBuf) {
        debug!(path = %path.display(), "registered for cleanup");
        self.lock().artifacts.push(path);
    }

    /// Whether `path` is tracked by this invocation.
    pub fn owns(&self, path: &Path) -> bool {
        self.lock().artifacts.iter().any(|p| p == path)
    }

    pub fn is_done(&self) -> bool {
        self.lock().done
    }

    /// Remove every registered artifact. Only the first call does anything.
    ///
    /// Returns the number of files removed. Failures are logged.
    pub fn run(&self) -> usize {
        let mut state = self.lock();
        if state.done {
            return 0;
        }
        state.done = true;

        let mut removed = 0;
        for path in state.artifacts.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "cleanup successful");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "already removed");
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "cleanup failed, please delete the file manually"
                    );
                }
            }
        }
        removed
    }

    /// Guard that runs cleanup when dropped.
    pub fn guard(&self) -> CleanupGuard {
        CleanupGuard(self.clone())
    }
}

/// Runs [`Cleanup::run`] on drop.
#[must_use]
pub struct CleanupGuard(Cleanup);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.0.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "x").unwrap();
        fs::write(&b, "y").unwrap();

        let cleanup = Cleanup::new();
        cleanup.register(a.clone());
        cleanup.register(b.clone());

        assert_eq!(cleanup.run(), 2);
        assert!(!a.exists());
        assert!(!b.exists());

        // A file recreated at the same path is not touched by a second run.
        fs::write(&a, "again").unwrap();
        assert_eq!(cleanup.run(), 0);
        assert!(a.exists());
        assert!(cleanup.is_done());
    }

    #[test]
    fn test_concurrent_runs_remove_once() {
        let dir = TempDir::new().unwrap();
        let cleanup = Cleanup::new();
        for i in 0..8 {
            let path = dir.path().join(format!("f{i}"));
            fs::write(&path, "x").unwrap();
            cleanup.register(path);
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cleanup = cleanup.clone();
                std::thread::spawn(move || cleanup.run())
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let cleanup = Cleanup::new();
        cleanup.register(dir.path().join("never-created"));
        assert_eq!(cleanup.run(), 0);
        assert!(cleanup.is_done());
    }

    #[test]
    fn test_guard_runs_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guarded");
        fs::write(&path, "x").unwrap();

        let cleanup = Cleanup::new();
        cleanup.register(path.clone());
        assert!(cleanup.owns(&path));
        {
            let _guard = cleanup.guard();
        }
        assert!(!path.exists());
        assert!(cleanup.is_done());
    }
}
