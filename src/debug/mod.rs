//! Debug utilities for tracking where pooled objects were borrowed.
//!
//! Trace capture is switched on at runtime with
//! [`set_debug_mode`](crate::set_debug_mode). The `debug` cargo feature adds
//! full call stacks to each trace; without it only the borrow site is kept.

pub(crate) mod backtrace;
pub(crate) mod leaks;

pub use self::backtrace::{StackFrame, StackTrace};
pub use self::leaks::LeakEntry;
