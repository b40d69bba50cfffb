//! esi - inject Secret Server secrets into other processes.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use esi::cli::output;
use esi::cli::{execute, Cli};
use esi::core::constants::FAILURE_EXIT_CODE;
use esi::error::{CipherError, ConfigError, Error, RemoteError, StoreError};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to stdout rules and the child.
    let filter = EnvFilter::try_from_env("ESI_LOG").unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("esi=debug")
        } else {
            EnvFilter::new("esi=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&e.to_string());
            if let Some(hint) = suggestion(&e) {
                output::hint(hint);
            }
            std::process::exit(FAILURE_EXIT_CODE);
        }
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Config(ConfigError::MissingField { .. }) => {
            Some("set secret_server.url in esi.yml or pass --config")
        }
        Error::Config(ConfigError::NoGroups) => Some("add a group with injectors to esi.yml"),
        Error::Cipher(CipherError::Malformed(_)) => Some("run: esi login --force"),
        Error::Remote(RemoteError::Forbidden(_)) | Error::NoSecrets => {
            Some("run: esi login --force")
        }
        Error::Store(StoreError::UnsupportedPlatform) => {
            Some("credential caching needs the Linux kernel keyring")
        }
        Error::NoCommand => Some("usage: esi [OPTIONS] -- <COMMAND>..."),
        _ => None,
    }
}
