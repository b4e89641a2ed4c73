//! Backing instances and the ownership-chain unwind.

use std::cell::UnsafeCell;
use std::sync::Arc;

use crate::api::releaser::{Poolable, Releaser};
use crate::core::shared::PoolShared;
use crate::diagnostics::{self, OP001};

/// Type-erased node of an ownership chain.
pub(crate) trait ChainLink: Send + Sync {
    fn releaser(&self) -> &Releaser;

    /// Run the Cleanup hook.
    ///
    /// # Safety
    ///
    /// The node must be borrowed and nothing else may access its value
    /// for the duration of the call.
    unsafe fn cleanup(&self);

    /// Settle the counters and hand the finished instance back.
    fn recycle(self: Arc<Self>);
}

/// One backing instance together with its control block.
///
/// The value is only reachable through the handle issued for the current
/// epoch (or through the ownership chain while that handle is being
/// released), which is what makes the `UnsafeCell` access exclusive.
/// References handed out by an owned handle are tied to a borrow of the
/// owner, so they end before the owner's release can start the unwind.
pub(crate) struct Slot<T: Poolable> {
    releaser: Releaser,
    shared: Arc<PoolShared<T>>,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by the borrow protocol above,
// so sharing a slot only ever moves a `T` between threads.
unsafe impl<T: Poolable> Send for Slot<T> {}
unsafe impl<T: Poolable> Sync for Slot<T> {}

impl<T: Poolable> Slot<T> {
    pub(crate) fn new(shared: Arc<PoolShared<T>>, releaser: Releaser, value: T) -> Self {
        Self {
            releaser,
            shared,
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    pub(crate) fn releaser(&self) -> &Releaser {
        &self.releaser
    }

    /// # Safety
    ///
    /// No mutable access to the value may be live.
    #[inline]
    pub(crate) unsafe fn value(&self) -> &T {
        &*self.value.get()
    }

    /// # Safety
    ///
    /// The caller must have exclusive access to the value.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn value_mut(&self) -> &mut T {
        &mut *self.value.get()
    }
}

impl<T: Poolable> ChainLink for Slot<T> {
    fn releaser(&self) -> &Releaser {
        &self.releaser
    }

    unsafe fn cleanup(&self) {
        self.value_mut().cleanup();
    }

    fn recycle(self: Arc<Self>) {
        let trace = self.releaser.take_borrow_trace();

        let shared = Arc::clone(&self.shared);
        shared.settle_release(trace.as_deref());
        shared.give_back(self);
    }
}

/// Release `root` and everything it owns.
///
/// Iterative so arbitrarily deep chains cannot overflow the stack. Each
/// node's Cleanup runs before the nodes it owns are touched.
pub(crate) fn unwind(root: Arc<dyn ChainLink>) {
    let mut next = Some(root);

    while let Some(node) = next {
        let releaser = node.releaser();
        if releaser.is_released() {
            diagnostics::fatal(&OP001, releaser.borrow_trace().as_deref());
        }

        // SAFETY: the node is borrowed. The root handle is mutably borrowed
        // by the caller. Owned handles only lend references for the length
        // of a borrow of their owner, and every owner up the chain is either
        // the root or already finished, which makes those handles stale.
        unsafe { node.cleanup() };

        next = releaser.finish();
        node.recycle();
    }
}
