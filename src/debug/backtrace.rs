//! Borrow-site stack traces.
//!
//! Records the call stack of a `get()`/`get_owned()` so outstanding borrows
//! can be explained later. The rendered trace doubles as the leak-table key.

use std::fmt;
use std::panic::Location;

/// Upper bound on recorded frames per trace.
#[cfg_attr(not(feature = "debug"), allow(dead_code))]
const MAX_FRAMES: usize = 100;

/// Function-name prefixes that belong to the capture path itself.
#[cfg(feature = "debug")]
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "ownpool::debug::backtrace::",
    "ownpool::core::shared::",
    "ownpool::api::pool::Pool<",
    "<ownpool::",
];

/// A single frame of a borrow trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name (demangled, without hash).
    pub function: String,
    /// Source file.
    pub file: String,
    /// Line within `file`.
    pub line: u32,
}

/// A captured borrow trace.
///
/// The first frame is always the `#[track_caller]` borrow site, so two
/// traces taken from different lines never compare equal even when no
/// symbol information is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Capture a trace for a borrow made at `location`.
    #[inline(never)]
    pub fn capture(location: &'static Location<'static>) -> Self {
        let mut frames = Vec::with_capacity(16);
        frames.push(StackFrame {
            function: "borrowed at".to_string(),
            file: location.file().to_string(),
            line: location.line(),
        });

        #[cfg(feature = "debug")]
        append_call_stack(&mut frames);

        Self { frames }
    }

    /// The recorded frames, borrow site first.
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// The borrow site frame.
    pub fn borrow_site(&self) -> &StackFrame {
        &self.frames[0]
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "{}\n\t{}:{}\n", frame.function, frame.file, frame.line)?;
        }
        Ok(())
    }
}

#[cfg(feature = "debug")]
fn append_call_stack(frames: &mut Vec<StackFrame>) {
    let mut skipping = true;

    ::backtrace::trace(|frame| {
        ::backtrace::resolve_frame(frame, |symbol| {
            if frames.len() >= MAX_FRAMES {
                return;
            }

            let function = symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_else(|| "<unknown>".to_string());

            if skipping {
                if INTERNAL_PREFIXES.iter().any(|p| function.starts_with(p)) {
                    return;
                }
                skipping = false;
            }

            frames.push(StackFrame {
                function,
                file: symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
                line: symbol.lineno().unwrap_or(0),
            });
        });

        frames.len() < MAX_FRAMES
    });
}
