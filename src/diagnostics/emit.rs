//! Diagnostic emission backend.
//!
//! Handles outputting diagnostics to stderr and the `log` crate, and turns
//! lifetime violations into panics.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use super::kind::{Diagnostic, DiagnosticKind};

/// Global flag to suppress diagnostic output (for testing).
static DIAGNOSTICS_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Global flag to enable verbose diagnostics.
static VERBOSE_DIAGNOSTICS: AtomicBool = AtomicBool::new(false);

/// Suppress all diagnostic output. Fatal diagnostics still panic.
pub fn suppress_diagnostics(suppress: bool) {
    DIAGNOSTICS_SUPPRESSED.store(suppress, Ordering::Relaxed);
}

/// Enable verbose diagnostic output.
pub fn set_verbose(verbose: bool) {
    VERBOSE_DIAGNOSTICS.store(verbose, Ordering::Relaxed);
}

/// Check if diagnostics are suppressed.
pub fn is_suppressed() -> bool {
    DIAGNOSTICS_SUPPRESSED.load(Ordering::Relaxed)
}

/// Emit a diagnostic to stderr (and the `log` crate when enabled).
pub fn emit(diag: &Diagnostic) {
    emit_with_context(diag, None);
}

/// Emit a diagnostic with additional runtime context, e.g. the borrow site.
pub fn emit_with_context(diag: &Diagnostic, context: Option<&str>) {
    if is_suppressed() {
        return;
    }

    emit_to_stderr(diag, context);

    #[cfg(feature = "log")]
    emit_to_log(diag, context);
}

/// Report a broken lifetime contract and abort the calling thread.
///
/// Continuing would corrupt the pool (the same backing instance handed out
/// twice), so there is no recoverable error path.
#[cold]
#[track_caller]
pub fn fatal(diag: &Diagnostic, context: Option<&str>) -> ! {
    emit_with_context(diag, context);
    match context {
        Some(context) => panic!("{}\n  context: {}", diag, context),
        None => panic!("{}", diag),
    }
}

/// Internal: emit to stderr.
fn emit_to_stderr(diag: &Diagnostic, context: Option<&str>) {
    let mut stderr = std::io::stderr().lock();
    let verbose = VERBOSE_DIAGNOSTICS.load(Ordering::Relaxed) || cfg!(feature = "diagnostics");

    let _ = writeln!(
        stderr,
        "[ownpool][{}] {}: {}",
        diag.code,
        diag.kind.prefix(),
        diag.message
    );

    if let Some(context) = context {
        let _ = writeln!(stderr, "  context: {}", context);
    }

    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }

    if let Some(help) = diag.help {
        let _ = writeln!(stderr, "  help: {}", help);
    }

    if verbose && diag.kind == DiagnosticKind::Error {
        let _ = writeln!(
            stderr,
            "  hint: enable debug mode (OWNPOOL_DEBUG=1) to see where objects were borrowed"
        );
    }

    let _ = writeln!(stderr);
}

#[cfg(feature = "log")]
fn emit_to_log(diag: &Diagnostic, context: Option<&str>) {
    match diag.kind {
        DiagnosticKind::Error => log::error!("[{}] {}", diag.code, diag.message),
        DiagnosticKind::Warning => log::warn!("[{}] {}", diag.code, diag.message),
        DiagnosticKind::Note => log::info!("[{}] {}", diag.code, diag.message),
    }
    if let Some(context) = context {
        log::info!("  context: {}", context);
    }
    if let Some(help) = diag.help {
        log::info!("  help: {}", help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::kind::OP001;

    #[test]
    #[should_panic(expected = "[ownpool][OP001] already released")]
    fn test_fatal_panics_with_code() {
        fatal(&OP001, None);
    }

    #[test]
    #[should_panic(expected = "context: borrowed at")]
    fn test_fatal_carries_context() {
        fatal(&OP001, Some("borrowed at src/lib.rs:1:1"));
    }
}
