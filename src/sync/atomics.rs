//! Atomic helpers for in-use accounting and statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// An atomic counter for statistics. Only ever grows.
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicU64);

impl AtomicCounter {
    /// Create a new counter.
    pub const fn new(initial: u64) -> Self {
        Self(AtomicU64::new(initial))
    }

    /// Increment the counter.
    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Number of borrows that have not been released yet.
///
/// Incremented once per borrow and decremented once per release; the
/// release protocol guarantees a decrement never outruns its increment.
#[derive(Debug, Default)]
pub struct InUseGauge(AtomicU64);

impl InUseGauge {
    /// Create a gauge at zero.
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Record a borrow. Returns the new value.
    #[inline]
    pub fn borrow(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record a release. Returns the new value.
    #[inline]
    pub fn release(&self) -> u64 {
        let previous = self.0.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "in-use gauge released below zero");
        previous - 1
    }

    /// Get the current value.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}
