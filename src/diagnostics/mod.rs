//! Lifetime-violation diagnostics.
//!
//! Every broken borrow/release contract is reported with a code before the
//! pool panics:
//!
//! | Code  | Meaning                                   |
//! |-------|-------------------------------------------|
//! | OP001 | Object released twice                     |
//! | OP002 | Owned object released directly            |
//! | OP003 | Instantiator ignored the given releaser   |
//! | OP004 | `get_owned()` with an idle owner          |
//! | OP005 | Handle used after release                 |
//! | OP006 | Owned object accessed without its owner   |
//! | OP101 | Handle dropped without release (warning)  |

pub mod emit;
pub mod kind;

pub use emit::{emit, emit_with_context, fatal, set_verbose, suppress_diagnostics};
pub use kind::{Diagnostic, DiagnosticKind};
pub use kind::{OP001, OP002, OP003, OP004, OP005, OP006, OP101};
