//! Global output mode, set once from the command line.
//!
//! `main` exports `--json` and `--quiet` as environment variables so every
//! command can check them without threading flags through.

use serde::Serialize;

pub const JSON_ENV: &str = "YT_TOOLS_JSON";
pub const QUIET_ENV: &str = "YT_TOOLS_QUIET";

fn flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Whether results should be printed as JSON.
pub fn is_json() -> bool {
    flag(JSON_ENV)
}

/// Whether non-essential output is suppressed.
pub fn is_quiet() -> bool {
    flag(QUIET_ENV)
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to encode JSON: {e}"),
    }
}

/// Print a status line unless `--quiet` or `--json` is active.
pub fn status(line: &str) {
    if !is_quiet() && !is_json() {
        println!("{line}");
    }
}
