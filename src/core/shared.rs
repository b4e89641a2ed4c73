//! State shared by all clones of a pool and by its backing instances.

use std::panic::Location;
use std::sync::Arc;

use crate::allocators::free_list::FreeList;
use crate::api::config::PoolMode;
use crate::api::releaser::{Poolable, Releaser};
use crate::core::global::Registry;
use crate::core::slot::Slot;
use crate::debug::backtrace::StackTrace;
use crate::diagnostics::{self, OP003};
use crate::sync::atomics::{AtomicCounter, InUseGauge};

pub(crate) type Instantiator<T> = Box<dyn Fn(Releaser) -> T + Send + Sync>;

pub(crate) struct PoolShared<T: Poolable> {
    pub(crate) name: &'static str,
    pub(crate) mode: PoolMode,
    pub(crate) free: FreeList<Arc<Slot<T>>>,
    instantiator: Instantiator<T>,
    pub(crate) registry: Arc<Registry>,

    pub(crate) in_use: InUseGauge,
    pub(crate) created: AtomicCounter,
    pub(crate) borrowed: AtomicCounter,
    pub(crate) recycled: AtomicCounter,
    pub(crate) discarded: AtomicCounter,
}

impl<T: Poolable> PoolShared<T> {
    pub(crate) fn new(
        name: &'static str,
        mode: PoolMode,
        max_idle: Option<usize>,
        registry: Arc<Registry>,
        instantiator: Instantiator<T>,
    ) -> Self {
        Self {
            name,
            mode,
            free: FreeList::new(max_idle),
            instantiator,
            registry,
            in_use: InUseGauge::new(),
            created: AtomicCounter::new(0),
            borrowed: AtomicCounter::new(0),
            recycled: AtomicCounter::new(0),
            discarded: AtomicCounter::new(0),
        }
    }

    /// Build a new backing instance with its permanent releaser.
    pub(crate) fn construct(self: &Arc<Self>) -> Arc<Slot<T>> {
        let releaser = Releaser::new();
        let value = (self.instantiator)(releaser.share());

        if !Releaser::ptr_eq(value.releaser(), &releaser) {
            diagnostics::fatal(&OP003, Some(self.name));
        }

        self.created.increment();
        Arc::new(Slot::new(Arc::clone(self), releaser, value))
    }

    /// Get an idle instance, or build one.
    #[inline]
    pub(crate) fn acquire(self: &Arc<Self>) -> Arc<Slot<T>> {
        self.borrowed.increment();
        match self.mode {
            PoolMode::Stub => self.construct(),
            PoolMode::Pooled => self.free.pop().unwrap_or_else(|| self.construct()),
        }
    }

    /// Record the borrow site of `releaser` if debug mode is on.
    pub(crate) fn track_borrow(&self, releaser: &Releaser, location: &'static Location<'static>) {
        if !self.registry.is_debug() {
            return;
        }

        let trace: Arc<str> = Arc::from(StackTrace::capture(location).to_string());
        self.registry.track_borrow(&trace);
        releaser.set_borrow_trace(Some(trace));
    }

    /// Settle the accounting of one release.
    #[inline]
    pub(crate) fn settle_release(&self, trace: Option<&str>) {
        self.in_use.release();
        if let Some(trace) = trace {
            self.registry.track_release(trace);
        }
    }

    /// Return a released instance to the free-list, or drop it.
    #[inline]
    pub(crate) fn give_back(&self, slot: Arc<Slot<T>>) {
        let kept = match self.mode {
            PoolMode::Stub => false,
            PoolMode::Pooled => self.free.push(slot),
        };

        if kept {
            self.recycled.increment();
        } else {
            self.discarded.increment();
        }
    }

    pub(crate) fn close(&self) {
        self.free.close();
        #[cfg(feature = "log")]
        log::debug!("ownpool: pool '{}' closed, {} objects still borrowed", self.name, self.in_use.get());
    }
}
