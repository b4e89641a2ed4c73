//! Process-wide pool registry.
//!
//! Aggregates the in-use counters of every pool and, in debug mode, the
//! outstanding borrows per borrow trace. Registration and the leak table
//! share one coarse lock; pool fast paths never take it unless debug mode
//! is on.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use crate::debug::leaks::{self, LeakEntry, LeakTable};
use crate::sync::mutex::Mutex;

/// A registered in-use counter. Must be safe to call from any thread.
type CounterFn = Box<dyn Fn() -> u64 + Send + Sync>;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

struct RegistryState {
    counters: Vec<CounterFn>,
    leaks: LeakTable,
}

/// Registry that pools report their in-use counters and borrow traces to.
///
/// Pools use [`Registry::global`] unless configured otherwise with
/// [`PoolConfig::with_registry`](crate::PoolConfig::with_registry).
pub struct Registry {
    state: Mutex<RegistryState>,
    debug: AtomicBool,
}

impl Registry {
    /// Create an empty registry with debug mode off.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                counters: Vec::new(),
                leaks: LeakTable::new(),
            }),
            debug: AtomicBool::new(false),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Arc<Registry> {
        &GLOBAL
    }

    /// Register a counter considered by [`objects_in_use_total`](Self::objects_in_use_total).
    ///
    /// Every pool registers itself on construction. Counters are called
    /// with the registry lock held and must not call back into the registry.
    pub fn register_counter<F>(&self, counter: F)
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.state.lock().counters.push(Box::new(counter));
    }

    /// Number of registered counters.
    pub fn counter_count(&self) -> usize {
        self.state.lock().counters.len()
    }

    /// Sum of all registered counters.
    pub fn objects_in_use_total(&self) -> u64 {
        let state = self.state.lock();
        state.counters.iter().map(|counter| counter()).sum()
    }

    /// Switch borrow-trace tracking on or off.
    ///
    /// Meant for tests and investigations: toggling while borrows are in
    /// flight leaves the leak table approximate.
    pub fn set_debug(&self, enabled: bool) {
        let was = self.debug.swap(enabled, Ordering::Relaxed);
        if was != enabled {
            #[cfg(feature = "log")]
            log::debug!("ownpool debug mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Whether borrow traces are being captured.
    #[inline]
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Borrow sites with unreleased objects, most borrows first.
    pub fn non_released(&self) -> Vec<LeakEntry> {
        self.state.lock().leaks.entries()
    }

    /// Print where currently unreleased objects were borrowed.
    ///
    /// Writes nothing if there are none (or debug mode never ran).
    pub fn print_non_released<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let entries = self.non_released();
        leaks::write_report(w, &entries)
    }

    pub(crate) fn track_borrow(&self, trace: &Arc<str>) {
        self.state.lock().leaks.record_borrow(trace);
    }

    pub(crate) fn track_release(&self, trace: &str) {
        self.state.lock().leaks.record_release(trace);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("counters", &self.counter_count())
            .field("debug", &self.is_debug())
            .finish()
    }
}

// =============================================================================
// Process-wide shortcuts
// =============================================================================

/// Total objects taken from all pools on the global registry and not yet returned.
pub fn objects_in_use_total() -> u64 {
    Registry::global().objects_in_use_total()
}

/// Register an extra counter with the global registry, e.g. for a pool
/// implemented elsewhere, so [`objects_in_use_total`] covers it too.
pub fn register_objects_in_use_counter<F>(counter: F)
where
    F: Fn() -> u64 + Send + Sync + 'static,
{
    Registry::global().register_counter(counter);
}

/// Switch debug mode of the global registry.
pub fn set_debug_mode(enabled: bool) {
    Registry::global().set_debug(enabled);
}

/// Whether the global registry captures borrow traces.
pub fn is_debug_mode() -> bool {
    Registry::global().is_debug()
}

/// Print the leak report of the global registry.
pub fn print_non_released<W: Write + ?Sized>(w: &mut W) -> io::Result<()> {
    Registry::global().print_non_released(w)
}
