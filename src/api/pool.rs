//! Typed pools and the handles they lend out.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::{Arc, Weak};

use crate::api::config::{PoolConfig, PoolMode};
use crate::api::releaser::{Poolable, Releaser};
use crate::api::stats::PoolStats;
use crate::core::shared::PoolShared;
use crate::core::slot::{self, ChainLink, Slot};
use crate::diagnostics::{self, OP001, OP002, OP004, OP005, OP006, OP101};

/// A thread-safe pool of `T` instances.
///
/// Every borrowed object must be released exactly once. Objects borrowed
/// with [`get_owned`](Self::get_owned) are released together with their
/// owner instead.
///
/// Cloning a pool is cheap; all clones share the same instances and
/// counters. Dropping the last clone closes the pool: idle instances are
/// freed and instances released later are dropped instead of recycled.
///
/// # Example
///
/// ```rust
/// use ownpool::{Pool, Poolable, Releaser};
///
/// struct Scratch {
///     releaser: Releaser,
///     buf: Vec<u8>,
/// }
///
/// impl Poolable for Scratch {
///     fn releaser(&self) -> &Releaser {
///         &self.releaser
///     }
///
///     fn init(&mut self) {
///         self.buf.reserve(1024);
///     }
///
///     fn cleanup(&mut self) {
///         self.buf.clear();
///     }
/// }
///
/// let pool = Pool::new(|releaser| Scratch { releaser, buf: Vec::new() });
///
/// let mut scratch = pool.get();
/// scratch.buf.extend_from_slice(b"hello");
/// assert_eq!(pool.objects_in_use(), 1);
///
/// scratch.release();
/// assert_eq!(pool.objects_in_use(), 0);
/// ```
///
/// # Reference cycles
///
/// Idle instances keep the pool's shared state alive. A pooled type that
/// stores a `Pool` of its own type (directly or through another pool that
/// stores this one) forms a cycle, and the pool is then never closed. Store
/// a [`WeakPool`] from [`downgrade`](Self::downgrade) instead.
pub struct Pool<T: Poolable> {
    inner: Arc<PoolInner<T>>,
}

/// Closes the shared state when the last `Pool` clone goes away.
struct PoolInner<T: Poolable> {
    shared: Arc<PoolShared<T>>,
}

impl<T: Poolable> Drop for PoolInner<T> {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl<T: Poolable> Pool<T> {
    /// Create a recycling pool.
    ///
    /// The instantiator builds a new instance bound to the given releaser.
    pub fn new<F>(instantiator: F) -> Self
    where
        F: Fn(Releaser) -> T + Send + Sync + 'static,
    {
        Self::with_config(PoolConfig::default(), instantiator)
    }

    /// Create a pool that constructs a fresh instance on every borrow.
    ///
    /// Release still runs Cleanup, unwinds owned objects and updates the
    /// counters, but nothing is ever reused.
    pub fn stub<F>(instantiator: F) -> Self
    where
        F: Fn(Releaser) -> T + Send + Sync + 'static,
    {
        Self::with_config(PoolConfig::stub(), instantiator)
    }

    /// Create a pool with explicit configuration.
    pub fn with_config<F>(config: PoolConfig, instantiator: F) -> Self
    where
        F: Fn(Releaser) -> T + Send + Sync + 'static,
    {
        let registry = config.registry_or_global();
        let name = config.name.unwrap_or_else(std::any::type_name::<T>);
        let shared = Arc::new(PoolShared::new(
            name,
            config.mode,
            config.max_idle,
            Arc::clone(&registry),
            Box::new(instantiator),
        ));

        let counter = Arc::downgrade(&shared);
        registry.register_counter(move || counter.upgrade().map_or(0, |shared| shared.in_use.get()));

        #[cfg(feature = "log")]
        log::debug!("ownpool: created {} pool '{}'", config.mode, name);

        Self {
            inner: Arc::new(PoolInner { shared }),
        }
    }

    #[inline]
    fn shared(&self) -> &Arc<PoolShared<T>> {
        &self.inner.shared
    }

    /// Borrow an object.
    ///
    /// Runs [`Poolable::init`] on it. In debug mode the caller's stack is
    /// recorded for the leak report.
    #[track_caller]
    pub fn get(&self) -> Pooled<T> {
        let location = Location::caller();
        let shared = self.shared();

        let slot = shared.acquire();
        let releaser = slot.releaser();
        releaser.reset();
        let epoch = releaser.epoch();

        shared.in_use.borrow();
        shared.track_borrow(releaser, location);

        // SAFETY: the instance was idle or brand new, so no handle for the
        // current epoch exists yet.
        unsafe { slot.value_mut().init() };

        Pooled::new(slot, epoch)
    }

    /// Borrow an object whose lifetime is bound to `owner`.
    ///
    /// The object joins the owner's ownership chain and is released
    /// automatically, after the owner's Cleanup, when the owner is released.
    /// The returned [`Owned`] handle only lends the object out against a
    /// borrow of `owner`.
    ///
    /// Typically called from the owner's [`Poolable::init`] with
    /// `&self.releaser`. Safe to call from several threads for the same
    /// owner.
    #[track_caller]
    pub fn get_owned(&self, owner: &Releaser) -> Owned<T> {
        let location = Location::caller();
        let shared = self.shared();

        let slot = shared.acquire();
        let releaser = slot.releaser();
        releaser.reset();
        releaser.set_owned();
        let epoch = releaser.epoch();

        shared.in_use.borrow();
        shared.track_borrow(releaser, location);

        // Linked before init, so objects borrowed for this one in its init
        // end up ahead of its older siblings in the chain.
        let Some(owner_epoch) = owner.push_owned(Arc::clone(&slot) as Arc<dyn ChainLink>) else {
            shared.settle_release(releaser.take_borrow_trace().as_deref());
            diagnostics::fatal(&OP004, Some(&location.to_string()));
        };

        // SAFETY: as in `get`; the chain only touches the value once the
        // owner is released, which needs the owner's init to have returned.
        unsafe { slot.value_mut().init() };

        Owned {
            slot,
            epoch,
            owner: owner.share(),
            owner_epoch,
            _marker: PhantomData,
        }
    }

    /// Build `count` idle instances ahead of time.
    ///
    /// No-op for stub pools. Stops early once `max_idle` is reached.
    pub fn prewarm(&self, count: usize) {
        if self.mode() == PoolMode::Stub {
            return;
        }

        let shared = self.shared();
        for _ in 0..count {
            if !shared.free.has_room() {
                break;
            }
            shared.free.push(shared.construct());
        }
    }

    /// Objects borrowed from this pool and not released yet.
    #[inline]
    pub fn objects_in_use(&self) -> u64 {
        self.shared().in_use.get()
    }

    /// Approximate number of idle instances ready for reuse.
    pub fn idle_count(&self) -> usize {
        self.shared().free.len()
    }

    /// Pool label.
    pub fn name(&self) -> &'static str {
        self.shared().name
    }

    /// Recycling mode.
    pub fn mode(&self) -> PoolMode {
        self.shared().mode
    }

    /// Snapshot of this pool's counters.
    pub fn stats(&self) -> PoolStats {
        let shared = self.shared();
        PoolStats {
            name: shared.name,
            mode: shared.mode,
            in_use: shared.in_use.get(),
            idle: shared.free.len(),
            created: shared.created.get(),
            borrowed: shared.borrowed.get(),
            recycled: shared.recycled.get(),
            discarded: shared.discarded.get(),
        }
    }

    /// A handle that does not keep the pool open.
    pub fn downgrade(&self) -> WeakPool<T> {
        WeakPool {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning pool handle, for pooled types that need their own pool.
pub struct WeakPool<T: Poolable> {
    inner: Weak<PoolInner<T>>,
}

impl<T: Poolable> WeakPool<T> {
    /// The pool, if it is still open.
    pub fn upgrade(&self) -> Option<Pool<T>> {
        self.inner.upgrade().map(|inner| Pool { inner })
    }
}

impl<T: Poolable> Clone for WeakPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Poolable> fmt::Debug for WeakPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPool")
            .field("open", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T: Poolable> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Poolable> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name())
            .field("mode", &self.mode())
            .field("in_use", &self.objects_in_use())
            .finish()
    }
}

/// A borrowed pool object.
///
/// Dereferences to `T` for as long as the borrow lasts. Return it with
/// [`release`](Self::release); touching it afterwards is fatal.
///
/// Dropping an unreleased handle does not return the object: the borrow
/// stays counted and, in debug mode, stays in the leak report.
pub struct Pooled<T: Poolable> {
    slot: Arc<Slot<T>>,
    epoch: u64,
    _marker: PhantomData<T>,
}

impl<T: Poolable> Pooled<T> {
    fn new(slot: Arc<Slot<T>>, epoch: u64) -> Self {
        Self {
            slot,
            epoch,
            _marker: PhantomData,
        }
    }

    /// Return the object (and everything it owns) to the pool.
    ///
    /// Runs [`Poolable::cleanup`], then releases the ownership chain.
    ///
    /// # Panics
    ///
    /// If the object was released already.
    pub fn release(&mut self) {
        if !self.is_live() {
            diagnostics::fatal(&OP001, None);
        }

        slot::unwind(Arc::clone(&self.slot) as Arc<dyn ChainLink>);
    }

    /// Whether the borrow behind this handle has ended.
    #[inline]
    pub fn is_released(&self) -> bool {
        !self.is_live()
    }

    /// The object's releaser, e.g. to borrow owned objects for it.
    pub fn releaser(&self) -> &Releaser {
        self.check_live();
        self.slot.releaser()
    }

    #[inline]
    fn is_live(&self) -> bool {
        self.slot.releaser().epoch() == self.epoch
    }

    #[inline]
    fn check_live(&self) {
        if !self.is_live() {
            diagnostics::fatal(&OP005, None);
        }
    }
}

impl<T: Poolable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.check_live();
        // SAFETY: the epoch matches, so this handle is the one live borrow.
        unsafe { self.slot.value() }
    }
}

impl<T: Poolable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.check_live();
        // SAFETY: as above, and `&mut self` rules out other references.
        unsafe { self.slot.value_mut() }
    }
}

impl<T: Poolable> Drop for Pooled<T> {
    fn drop(&mut self) {
        if !self.is_live() {
            return;
        }

        // Only borrows made in debug mode carry a trace worth reporting.
        if let Some(trace) = self.slot.releaser().borrow_trace() {
            diagnostics::emit_with_context(&OP101, Some(&trace));
        }
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_live() {
            f.debug_tuple("Pooled").field(&**self).finish()
        } else {
            f.write_str("Pooled(<released>)")
        }
    }
}

/// An object borrowed with [`Pool::get_owned`].
///
/// It is released together with its owner and cannot be released on its
/// own. The object is only reachable through [`get`](Self::get) and
/// [`get_mut`](Self::get_mut), which take the owner's releaser: the
/// returned reference borrows the owner, so it cannot outlive the owner's
/// release.
///
/// ```rust,compile_fail
/// use ownpool::{Pool, Poolable, Releaser};
///
/// struct Node {
///     releaser: Releaser,
///     value: u64,
/// }
///
/// impl Poolable for Node {
///     fn releaser(&self) -> &Releaser {
///         &self.releaser
///     }
/// }
///
/// let pool = Pool::new(|releaser| Node { releaser, value: 1 });
/// let mut owner = pool.get();
/// let child = pool.get_owned(owner.releaser());
///
/// let value = &child.get(owner.releaser()).value;
/// owner.release(); // error: `owner` is still borrowed
/// println!("{}", value);
/// ```
pub struct Owned<T: Poolable> {
    slot: Arc<Slot<T>>,
    epoch: u64,
    owner: Releaser,
    owner_epoch: u64,
    _marker: PhantomData<T>,
}

impl<T: Poolable> Owned<T> {
    /// Shared access, for as long as `owner` stays borrowed.
    ///
    /// # Panics
    ///
    /// If `owner` is not the releaser this object was borrowed for, or if
    /// the object was released with its owner.
    pub fn get<'a>(&'a self, owner: &'a Releaser) -> &'a T {
        self.check_access(owner);
        // SAFETY: the owner is live and borrowed for 'a, so the chain
        // cannot be unwound while the reference exists.
        unsafe { self.slot.value() }
    }

    /// Exclusive access, for as long as `owner` stays borrowed.
    ///
    /// # Panics
    ///
    /// As [`get`](Self::get).
    pub fn get_mut<'a>(&'a mut self, owner: &'a Releaser) -> &'a mut T {
        self.check_access(owner);
        // SAFETY: as in `get`; `&mut self` rules out other references
        // lent by this handle, and it is the only handle for this epoch.
        unsafe { self.slot.value_mut() }
    }

    /// Owned objects are released with their owner; calling this is always
    /// a fatal error.
    #[track_caller]
    pub fn release(&mut self) {
        diagnostics::fatal(&OP002, self.slot.releaser().borrow_trace().as_deref());
    }

    /// Always true: this object can only be released through its owner.
    #[inline]
    pub fn is_owned(&self) -> bool {
        true
    }

    /// Whether the owner has been released, taking this object with it.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.slot.releaser().epoch() != self.epoch
    }

    fn check_access(&self, owner: &Releaser) {
        if !Releaser::ptr_eq(owner, &self.owner) {
            diagnostics::fatal(&OP006, None);
        }
        // A recycled owner keeps its releaser, so its epoch tells a stale
        // handle apart from one issued for the current borrow.
        if owner.epoch() != self.owner_epoch || self.is_released() {
            diagnostics::fatal(&OP005, None);
        }
    }
}

impl<T: Poolable> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("released", &self.is_released())
            .finish()
    }
}
