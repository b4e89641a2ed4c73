//! Diagnostic kinds and the predefined lifetime-violation codes.
//!
//! Codes follow the pattern:
//! - `OP0xx` - Borrow/release lifetime violations (always fatal)

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A broken lifetime contract. Emitted right before the pool panics.
    Error,
    /// Something is probably wrong, e.g. a handle dropped without release.
    Warning,
    /// Additional context about another diagnostic.
    Note,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "OP001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ownpool][{}] {}", self.code, self.message)
    }
}

// =============================================================================
// Predefined diagnostics (OP0xx - lifetime violations)
// =============================================================================

/// OP001: The object was already returned to its pool.
pub const OP001: Diagnostic = Diagnostic::error("OP001", "already released")
    .with_note("returning the same instance twice would hand it to two borrowers")
    .with_help("release each borrowed object exactly once");

/// OP002: An owned object was released directly.
pub const OP002: Diagnostic = Diagnostic::error("OP002", "must be released by owner")
    .with_note("this object was borrowed with get_owned() and belongs to an ownership chain")
    .with_help("release the root owner; owned objects are released with it");

/// OP003: The instantiator did not store the releaser it was given.
pub const OP003: Diagnostic = Diagnostic::error(
    "OP003",
    "instantiator returned an object bound to a foreign releaser",
)
.with_help("store the Releaser passed to the instantiator and return it from Poolable::releaser()");

/// OP004: `get_owned()` was called with an owner that is not borrowed.
pub const OP004: Diagnostic = Diagnostic::error("OP004", "owner is not borrowed")
    .with_note("the owner's releaser is idle in its pool or already released")
    .with_help("only borrow owned objects while the owner itself is borrowed, e.g. from Poolable::init()");

/// OP005: A handle was dereferenced after its object went back to the pool.
pub const OP005: Diagnostic = Diagnostic::error("OP005", "use after release")
    .with_note("the instance may already belong to another borrower")
    .with_help("do not touch an object or any of its fields after it (or its owner) is released");

/// OP006: An owned object was accessed through something other than its owner.
pub const OP006: Diagnostic = Diagnostic::error("OP006", "not the owner of this object")
    .with_note("owned objects lend references only while their owner is borrowed")
    .with_help("pass the releaser of the object this one was borrowed for with get_owned()");

/// OP101: A borrowed handle was dropped without being released.
pub const OP101: Diagnostic = Diagnostic::warning("OP101", "pooled object dropped without release")
    .with_note("the borrow stays counted as in use and appears in the leak report");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_codes_are_errors() {
        for diag in [OP001, OP002, OP003, OP004, OP005, OP006] {
            assert_eq!(diag.kind, DiagnosticKind::Error);
            assert!(diag.help.is_some());
        }
        assert_eq!(OP101.kind, DiagnosticKind::Warning);
    }

    #[test]
    fn test_display_has_code_and_message() {
        assert_eq!(OP001.to_string(), "[ownpool][OP001] already released");
    }
}
