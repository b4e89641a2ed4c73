//! Lock-free free-list of idle backing instances.
//!
//! Released instances are pushed here and popped by the next borrower.
//! Closing the list drops everything it holds and refuses further pushes.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_queue::SegQueue;

/// Unbounded (or optionally capped) queue of idle instances.
pub(crate) struct FreeList<T> {
    queue: SegQueue<T>,
    max_idle: Option<usize>,
    closed: AtomicBool,
}

impl<T> FreeList<T> {
    /// Create a free-list keeping at most `max_idle` idle items.
    pub(crate) fn new(max_idle: Option<usize>) -> Self {
        Self {
            queue: SegQueue::new(),
            max_idle,
            closed: AtomicBool::new(false),
        }
    }

    /// Take an idle item, if any.
    #[inline]
    pub(crate) fn pop(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Offer an item for reuse.
    ///
    /// Returns `false` (dropping the item) when the list is full or closed.
    #[inline]
    pub(crate) fn push(&self, item: T) -> bool {
        if self.is_closed() {
            return false;
        }
        if let Some(max_idle) = self.max_idle {
            // len() is approximate under contention; the cap is a soft bound.
            if self.queue.len() >= max_idle {
                return false;
            }
        }

        self.queue.push(item);

        // Lost a race with close(): do not leave anything behind.
        if self.is_closed() {
            self.drain();
        }
        true
    }

    /// Approximate number of idle items.
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether there is room for one more idle item.
    pub(crate) fn has_room(&self) -> bool {
        !self.is_closed() && self.max_idle.map_or(true, |max_idle| self.len() < max_idle)
    }

    /// Stop accepting items and drop the idle ones.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.drain();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn drain(&self) {
        while self.queue.pop().is_some() {}
    }
}
