//! Command-line interface.

pub mod completions;
pub mod login;
pub mod output;
pub mod run;
pub mod shell;
pub mod version;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::exec::Mode;
use crate::error::Result;

/// esi - inject Secret Server secrets into other processes.
#[derive(Parser)]
#[command(
    name = "esi",
    about = "Fetch secrets from TSS and inject them into other processes as environment variables, files, or stdout",
    version,
    after_help = "Example: esi -- printenv MY_SECRET"
)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "ESI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Injector as <group>.<injector> (defaults to the workspace file)
    #[arg(long, global = true)]
    pub injector: Option<String>,

    /// Enable debug logs
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Command and arguments to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the command in a subshell
    Shell {
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },

    /// Authenticate and cache credentials without running anything
    Login {
        /// Ask for a new password and token
        #[arg(short, long)]
        force: bool,
    },

    /// Print the version details
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute the parsed command line and return the process exit code.
pub fn execute(cli: Cli) -> Result<i32> {
    let config = cli.config.as_deref();
    let injector = cli.injector.as_deref();

    match cli.command {
        None => run::execute(Mode::Direct, config, injector, &cli.args),
        Some(Command::Shell { args }) => shell::execute(config, injector, &args),
        Some(Command::Login { force }) => login::execute(config, force).map(|()| 0),
        Some(Command::Version) => {
            version::execute();
            Ok(0)
        }
        Some(Command::Completions { shell }) => {
            completions::execute(shell, &mut std::io::stdout());
            Ok(0)
        }
    }
}
