//! Spawning and waiting on the child.
//!
//! On Unix a background thread listens for signals from the moment a
//! [`SignalForwarder`] is installed. Terminating signals run the cleanup
//! first. Once a child is attached every received signal is forwarded to
//! it; before that, a terminating signal ends this process with the usual
//! `128 + signal` status.

use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::core::cleanup::Cleanup;
use crate::core::constants::FAILURE_EXIT_CODE;
use crate::error::Result;

/// Signal listener tied to one [`Cleanup`]. Stops when dropped.
pub struct SignalForwarder {
    #[cfg(unix)]
    inner: unix::Forwarder,
}

impl SignalForwarder {
    /// Start listening for signals.
    ///
    /// Install this before creating any artifact so an interrupt never
    /// leaves files behind.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the signal handlers cannot be registered.
    pub fn install(cleanup: &Cleanup) -> Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                inner: unix::Forwarder::start(cleanup.clone())?,
            })
        }
        #[cfg(not(unix))]
        {
            let _ = cleanup;
            Ok(Self {})
        }
    }

    fn attach(&self, pid: u32) {
        #[cfg(unix)]
        self.inner.attach(pid);
        #[cfg(not(unix))]
        let _ = pid;
    }
}

/// Spawn `command`, wait for it, and return its exit code.
///
/// Installs its own [`SignalForwarder`] for the duration of the call.
///
/// # Errors
///
/// Returns an I/O error if the command cannot be spawned or waited on.
pub fn run(command: Command, cleanup: &Cleanup) -> Result<i32> {
    let signals = SignalForwarder::install(cleanup)?;
    run_with(command, &signals)
}

/// Spawn `command` under an already installed forwarder and wait for it.
///
/// # Errors
///
/// Returns an I/O error if the command cannot be spawned or waited on.
pub fn run_with(mut command: Command, signals: &SignalForwarder) -> Result<i32> {
    let mut child = command.spawn()?;
    debug!(pid = child.id(), program = ?command.get_program(), "spawned child process");
    signals.attach(child.id());

    let status = child.wait()?;
    let code = exit_code(status);
    debug!(code, "child process exited");
    Ok(code)
}

/// Exit code mirroring `status`: the child's code, or 128 plus the signal
/// number if it was killed by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    FAILURE_EXIT_CODE
}

#[cfg(unix)]
mod unix {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread::JoinHandle;

    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2};
    use signal_hook::iterator::{Handle, Signals};
    use tracing::{debug, warn};

    use crate::core::cleanup::Cleanup;
    use crate::error::Result;

    const FORWARDED: &[libc::c_int] = &[SIGINT, SIGTERM, SIGHUP, SIGQUIT, SIGUSR1, SIGUSR2];

    /// No child attached yet.
    const NO_CHILD: u32 = 0;

    pub struct Forwarder {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
        child: Arc<AtomicU32>,
    }

    impl Forwarder {
        pub fn start(cleanup: Cleanup) -> Result<Self> {
            let mut signals = Signals::new(FORWARDED)?;
            let handle = signals.handle();
            let child = Arc::new(AtomicU32::new(NO_CHILD));
            let target = Arc::clone(&child);

            let thread = std::thread::spawn(move || {
                for signal in signals.forever() {
                    let terminating = matches!(signal, SIGINT | SIGTERM | SIGHUP | SIGQUIT);
                    if terminating {
                        debug!(signal, "terminating signal received, cleaning up");
                        cleanup.run();
                    }

                    let pid = target.load(Ordering::SeqCst);
                    if pid == NO_CHILD {
                        if terminating {
                            debug!(signal, "no child process yet, exiting");
                            std::process::exit(128 + signal);
                        }
                        continue;
                    }

                    // SAFETY: plain kill(2) on the pid of a child we spawned.
                    let rc = unsafe { libc::kill(pid as libc::pid_t, signal) };
                    if rc != 0 {
                        warn!(signal, pid, "failed to forward signal");
                    }
                }
            });

            Ok(Self {
                handle,
                thread: Some(thread),
                child,
            })
        }

        pub fn attach(&self, pid: u32) {
            self.child.store(pid, Ordering::SeqCst);
        }
    }

    impl Drop for Forwarder {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                if thread.join().is_err() {
                    warn!("signal forwarder panicked");
                }
            }
        }
    }
}
