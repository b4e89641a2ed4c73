//! # ownpool
//!
//! Thread-safe object pools with checked lifetimes.
//!
//! ## Features
//!
//! - Typed pools backed by a lock-free free-list (or a non-recycling stub)
//! - Release-exactly-once handles: double release is fatal, not silent
//! - Ownership chains: objects borrowed with `get_owned` are released with
//!   their owner, never on their own
//! - Optional `init`/`cleanup` hooks run on every borrow/release
//! - Process-wide in-use counters for leak assertions in tests
//! - Debug mode: leak report grouped by borrow call stack
//!
//! ## Quick Start
//!
//! ```rust
//! use ownpool::{Pool, Poolable, Releaser};
//!
//! struct Request {
//!     releaser: Releaser,
//!     headers: Vec<(String, String)>,
//! }
//!
//! impl Poolable for Request {
//!     fn releaser(&self) -> &Releaser {
//!         &self.releaser
//!     }
//!
//!     fn cleanup(&mut self) {
//!         self.headers.clear();
//!     }
//! }
//!
//! let pool = Pool::new(|releaser| Request { releaser, headers: Vec::new() });
//!
//! let mut req = pool.get();
//! req.headers.push(("host".into(), "example.org".into()));
//! req.release(); // back to the pool; `req` must not be used any more
//! ```
//!
//! ## Ownership chains
//!
//! A pooled object that holds other pooled objects borrows them with
//! [`Pool::get_owned`], usually from its `init` hook. Releasing the owner
//! runs its `cleanup` first, then releases everything it owns, recursively.
//! Calling `release` on an owned object directly is a fatal error.
//!
//! ```rust
//! use ownpool::{Owned, Pool, Poolable, Releaser};
//!
//! struct Body {
//!     releaser: Releaser,
//!     bytes: Vec<u8>,
//! }
//!
//! impl Poolable for Body {
//!     fn releaser(&self) -> &Releaser {
//!         &self.releaser
//!     }
//!
//!     fn cleanup(&mut self) {
//!         self.bytes.clear();
//!     }
//! }
//!
//! struct Response {
//!     releaser: Releaser,
//!     bodies: Pool<Body>,
//!     body: Option<Owned<Body>>,
//! }
//!
//! impl Poolable for Response {
//!     fn releaser(&self) -> &Releaser {
//!         &self.releaser
//!     }
//!
//!     fn init(&mut self) {
//!         self.body = Some(self.bodies.get_owned(&self.releaser));
//!     }
//! }
//!
//! impl Response {
//!     fn body_mut(&mut self) -> &mut Body {
//!         self.body.as_mut().unwrap().get_mut(&self.releaser)
//!     }
//! }
//!
//! let bodies = Pool::new(|releaser| Body { releaser, bytes: Vec::new() });
//! let responses = Pool::new(move |releaser| Response {
//!     releaser,
//!     bodies: bodies.clone(),
//!     body: None,
//! });
//!
//! let mut resp = responses.get();
//! resp.body_mut().bytes.extend_from_slice(b"ok");
//! resp.release(); // the body goes back to its pool too
//! ```
//!
//! ## Debug mode
//!
//! ```rust,no_run
//! ownpool::set_debug_mode(true);
//! // ... run the workload ...
//! ownpool::print_non_released(&mut std::io::stderr()).unwrap();
//! ```

pub mod api;
pub mod debug;
pub mod diagnostics;

mod allocators;
mod core;
mod sync;

// Re-export public API at crate root for convenience
pub use api::config::{init_from_env, PoolConfig, PoolMode, DEBUG_ENV_VAR};
pub use api::pool::{Owned, Pool, Pooled, WeakPool};
pub use api::releaser::{Poolable, Releaser};
pub use api::stats::PoolStats;

// Registry and process-wide shortcuts
pub use crate::core::global::{
    is_debug_mode, objects_in_use_total, print_non_released, register_objects_in_use_counter,
    set_debug_mode, Registry,
};

// Debug reporting
pub use debug::{LeakEntry, StackFrame, StackTrace};

// Diagnostics
pub use diagnostics::{suppress_diagnostics, Diagnostic, DiagnosticKind};
