//! Per-instance control block and the pooled-type capability trait.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::slot::ChainLink;
use crate::sync::mutex::Mutex;

/// A type that can live in a [`Pool`](crate::Pool).
///
/// The pool hands a fresh [`Releaser`] to the instantiator; the instance must
/// store it and return it from [`releaser`](Self::releaser). Nested objects
/// that must not outlive this one are borrowed with
/// [`Pool::get_owned`](crate::Pool::get_owned) passing that releaser.
///
/// # Example
///
/// ```rust
/// use ownpool::{Poolable, Releaser};
///
/// struct Message {
///     releaser: Releaser,
///     body: Vec<u8>,
/// }
///
/// impl Poolable for Message {
///     fn releaser(&self) -> &Releaser {
///         &self.releaser
///     }
///
///     fn cleanup(&mut self) {
///         self.body.clear();
///     }
/// }
/// ```
pub trait Poolable: Send + 'static {
    /// The releaser this instance was constructed with.
    fn releaser(&self) -> &Releaser;

    /// Called on every borrow, after the releaser is reset.
    fn init(&mut self) {}

    /// Called once per release, before owned objects are released and
    /// before the instance goes back to its pool.
    fn cleanup(&mut self) {}
}

/// Control block of one backing instance.
///
/// Tracks whether the current borrow is released or owned and holds the
/// ownership chain of objects borrowed with
/// [`Pool::get_owned`](crate::Pool::get_owned).
///
/// Not `Clone`: the only `&Releaser` outside the pool is a borrow of the
/// pooled object (or its handle), so anything tied to that borrow cannot
/// outlive the object's release.
pub struct Releaser {
    state: Arc<ReleaserState>,
}

struct ReleaserState {
    /// True while the instance is idle (never borrowed, or released).
    released: AtomicBool,
    owned: AtomicBool,
    /// Bumped on every release; handles issued for an older epoch are stale.
    epoch: AtomicU64,
    /// Most recently owned object; each link holds the previous one.
    owned_tail: Mutex<Option<Arc<dyn ChainLink>>>,
    /// Rendered borrow trace, only set in debug mode.
    borrow_trace: Mutex<Option<Arc<str>>>,
}

impl Releaser {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(ReleaserState {
                released: AtomicBool::new(true),
                owned: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                owned_tail: Mutex::new(None),
                borrow_trace: Mutex::new(None),
            }),
        }
    }

    /// Whether the object may only be released through its owner.
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.state.owned.load(Ordering::Acquire)
    }

    /// Whether the object is currently not borrowed.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.state.released.load(Ordering::Acquire)
    }

    /// Whether both references point at the same control block.
    #[inline]
    pub fn ptr_eq(a: &Releaser, b: &Releaser) -> bool {
        Arc::ptr_eq(&a.state, &b.state)
    }

    /// Another handle to the same control block.
    pub(crate) fn share(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }

    /// Start a new borrow: unreleased and unowned.
    #[inline]
    pub(crate) fn reset(&self) {
        self.state.owned.store(false, Ordering::Relaxed);
        self.state.released.store(false, Ordering::Release);
    }

    #[inline]
    pub(crate) fn set_owned(&self) {
        self.state.owned.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.state.epoch.load(Ordering::Acquire)
    }

    /// End the current borrow and detach the owned chain.
    ///
    /// Every handle issued so far becomes stale. Runs under the chain lock so
    /// a concurrent [`push_owned`](Self::push_owned) either lands before the
    /// tail is detached or sees the owner released.
    pub(crate) fn finish(&self) -> Option<Arc<dyn ChainLink>> {
        let mut tail = self.state.owned_tail.lock();
        self.state.released.store(true, Ordering::Release);
        self.state.epoch.fetch_add(1, Ordering::AcqRel);
        tail.take()
    }

    /// Link `node` as the newest owned object.
    ///
    /// The previous tail moves beneath `node` in one step. Returns the
    /// owner's epoch, or `None` if the owner is not borrowed.
    pub(crate) fn push_owned(&self, node: Arc<dyn ChainLink>) -> Option<u64> {
        let mut tail = self.state.owned_tail.lock();
        if self.is_released() {
            return None;
        }

        // `node` was just borrowed, so its own chain lock is uncontended.
        let mut node_tail = node.releaser().state.owned_tail.lock();
        debug_assert!(node_tail.is_none(), "fresh borrow with a non-empty chain");
        *node_tail = tail.take();
        drop(node_tail);

        *tail = Some(node);
        Some(self.epoch())
    }

    pub(crate) fn set_borrow_trace(&self, trace: Option<Arc<str>>) {
        *self.state.borrow_trace.lock() = trace;
    }

    pub(crate) fn take_borrow_trace(&self) -> Option<Arc<str>> {
        self.state.borrow_trace.lock().take()
    }

    pub(crate) fn borrow_trace(&self) -> Option<Arc<str>> {
        self.state.borrow_trace.lock().clone()
    }
}

impl fmt::Debug for Releaser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Releaser")
            .field("released", &self.is_released())
            .field("owned", &self.is_owned())
            .field("epoch", &self.epoch())
            .finish()
    }
}
