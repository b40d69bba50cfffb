//! Version command.

/// Print version details.
///
/// Commit, date, and builder come from `ESI_COMMIT`, `ESI_BUILD_DATE`, and
/// `ESI_BUILT_BY` at compile time.
pub fn execute() {
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Commit: {}", option_env!("ESI_COMMIT").unwrap_or("none"));
    println!("Date: {}", option_env!("ESI_BUILD_DATE").unwrap_or("unknown"));
    println!("BuiltBy: {}", option_env!("ESI_BUILT_BY").unwrap_or("cargo"));
}
