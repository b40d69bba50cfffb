//! esi - inject secrets from Thycotic/Delinea Secret Server into other processes.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── run           # Direct execution (default command)
//! │   ├── shell         # Subshell execution
//! │   ├── login         # Authenticate and cache credentials
//! │   ├── version       # Version details
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # esi.yml loading and lookups
//!     ├── workspace     # .esi-workspace.yml discovery
//!     ├── cipher/       # Password-based envelope encryption
//!     ├── store/        # Keyring-backed credential stores
//!     │   ├── backend   # Platform selection
//!     │   └── keyutils  # Linux kernel keyrings
//!     ├── credentials   # Password and token cache
//!     ├── remote/       # Secret server sessions
//!     ├── auth          # Session setup
//!     ├── resolver      # Required secrets and fetch retries
//!     ├── inject/       # Env, stdout, and temp-file injection
//!     ├── cleanup       # One-shot artifact removal
//!     ├── exec/         # Child process and signal forwarding
//!     └── manager       # Invocation state machine
//! ```
//!
//! # Flow
//!
//! 1. Unlock the cached API token with the session password (prompting when
//!    either is missing or stale) and open a server session.
//! 2. Pick an injector from `--injector`, the workspace file, or a prompt.
//! 3. Fetch every secret the injector references.
//! 4. Apply its rules, then run the command and clean up after it.

pub mod cli;
pub mod core;
pub mod error;
