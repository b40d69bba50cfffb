//! Shell command.
//!
//! Same as the default command, but the arguments are joined and run
//! through the user's shell.

use std::path::Path;

use crate::cli::run;
use crate::core::exec::Mode;
use crate::error::Result;

/// Run `args` in a subshell with secrets injected.
pub fn execute(config: Option<&Path>, injector: Option<&str>, args: &[String]) -> Result<i32> {
    run::execute(Mode::Subshell, config, injector, args)
}
