//! Synchronization primitives.
//!
//! Thin wrappers over std or parking_lot mutexes, plus the atomic gauges
//! pools use for their in-use accounting.

pub(crate) mod atomics;
pub(crate) mod mutex;
