//! Diagnostic logging.
//!
//! The reference corpus never pulls in `log` or `tracing`; diagnostics are
//! plain `eprintln!` calls (see `utils::error` in the sibling CLI crates).
//! This mirrors that, except the filesystem core never exits the process on
//! error: it logs and lets the caller decide what to do with the `Result`.

use std::fmt::Display;

/// Writes a one-line diagnostic to stderr, tagged with the operation that produced it.
pub fn log(op: &str, msg: impl Display) {
	eprintln!("ssfs: {op}: {msg}");
}
