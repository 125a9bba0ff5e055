//! User-facing output formatter.
//!
//! Results go to stdout, warnings and errors to stderr. Node errors are
//! shown verbatim: the tool has no retry logic, so the operator needs the
//! node's own wording to decide what to do next.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Error;
use serde::Serialize;

// ---------------------------------------------------------------------------
// JSON mode
// ---------------------------------------------------------------------------

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode globally.
///
/// When enabled, [`print_error`] emits `{"error": "..."}` and commands that
/// return data print it with [`print_json`] instead of prose.
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::Relaxed);
}

/// Returns `true` if JSON output mode is currently active.
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Success / info / warning primitives
// ---------------------------------------------------------------------------

/// Print a success message to stdout: "✓ {msg}"
pub fn print_success(msg: &str) {
    println!("\u{2713} {msg}");
}

/// Print an informational message to stdout.
pub fn print_info(msg: &str) {
    println!("{msg}");
}

/// Print a warning to stderr: "⚠ {msg}"
pub fn print_warning(msg: &str) {
    eprintln!("\u{26A0} {msg}");
}

/// Pretty-print any serialisable value as JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Error formatting
// ---------------------------------------------------------------------------

/// Render an error and its context chain on one line, outermost first.
pub fn format_error(err: &Error) -> String {
    format!("{err:#}")
}

/// Render an error as a `{"error": "..."}` JSON document.
pub fn format_error_json(err: &Error) -> String {
    serde_json::json!({ "error": format_error(err) }).to_string()
}

/// Format and print an error to stderr.
///
/// In JSON mode, emits `{"error": "..."}` instead of plain text.
pub fn print_error(err: &Error) {
    if is_json_mode() {
        eprintln!("{}", format_error_json(err));
    } else {
        eprintln!("{}", format_error(err));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
