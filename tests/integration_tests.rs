//! Integration tests for ownpool.

use ownpool::{Pool, PoolConfig, PoolMode, Poolable, Registry, Releaser};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;

/// Pooled struct holding a buffer that must be acquired per borrow.
struct Buffered {
    releaser: Releaser,
    bb: Option<Vec<u8>>,
    fld1: usize,
}

impl Poolable for Buffered {
    fn releaser(&self) -> &Releaser {
        &self.releaser
    }

    fn init(&mut self) {
        self.bb = Some(Vec::with_capacity(64));
    }

    fn cleanup(&mut self) {
        self.bb = None;
    }
}

fn buffered_pool(registry: &Arc<Registry>, mode: PoolMode) -> Pool<Buffered> {
    let config = PoolConfig::default()
        .with_mode(mode)
        .with_registry(registry.clone());
    Pool::with_config(config, |releaser| Buffered {
        releaser,
        bb: None,
        fld1: 0,
    })
}

#[test]
fn test_basic_get_release() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);

    let mut obj = pool.get();

    // Init ran on borrow
    assert!(obj.bb.is_some());
    assert_eq!(registry.objects_in_use_total(), 1);

    obj.release();
    assert_eq!(registry.objects_in_use_total(), 0);

    // Unable to return the same object twice
    let second = catch_unwind(AssertUnwindSafe(|| obj.release()));
    assert!(second.is_err());

    // The failed release did not touch the counters
    assert_eq!(registry.objects_in_use_total(), 0);
}

#[test]
fn test_counter_tracks_gets_minus_releases() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);

    let mut held = Vec::new();
    for round in 0..5 {
        for _ in 0..3 {
            held.push(pool.get());
        }
        for _ in 0..round.min(held.len()) {
            let mut obj = held.pop().unwrap();
            obj.release();
        }
    }

    assert_eq!(pool.objects_in_use(), held.len() as u64);

    for obj in &mut held {
        obj.release();
    }
    assert_eq!(pool.objects_in_use(), 0);
    assert_eq!(registry.objects_in_use_total(), 0);
}

#[test]
fn test_pooled_mode_recycles_after_release() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);

    let mut a = pool.get();
    a.fld1 = 7;
    a.release();

    // The recycled instance keeps plain fields; only the hooks reset state.
    let mut b = pool.get();
    assert_eq!(b.fld1, 7);
    assert!(b.bb.is_some());
    b.release();

    assert_eq!(pool.stats().created, 1);
}

#[test]
fn test_stub_mode_builds_fresh_instances() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Stub);

    let mut a = pool.get();
    a.fld1 = 7;
    a.release();

    let mut b = pool.get();
    assert_eq!(b.fld1, 0);

    let second = catch_unwind(AssertUnwindSafe(|| {
        b.release();
        b.release();
    }));
    assert!(second.is_err());
    assert_eq!(pool.objects_in_use(), 0);

    let stats = pool.stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.recycled, 0);
}

#[test]
fn test_live_borrows_never_share_an_instance() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);

    let held: Vec<_> = (0..100).map(|_| pool.get()).collect();
    let addresses: HashSet<*const Buffered> = held.iter().map(|obj| &**obj as *const Buffered).collect();
    assert_eq!(addresses.len(), 100);

    for mut obj in held {
        obj.release();
    }
}

#[test]
fn test_concurrent_borrow_release_pairs() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);
    let (tx, rx) = mpsc::channel();

    let producers: Vec<_> = (0..4)
        .map(|thread_id| {
            let pool = pool.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    let mut obj = pool.get();
                    obj.fld1 = thread_id * 250 + i;
                    tx.send(obj).expect("receiver alive");
                }
            })
        })
        .collect();
    drop(tx);

    let mut numbers = HashSet::new();
    for mut obj in rx {
        let n = obj.fld1;
        obj.release();
        assert!(n < 1000, "{}", n);
        assert!(numbers.insert(n), "value {} seen twice", n);
    }

    for handle in producers {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(numbers.len(), 1000);
    assert_eq!(pool.objects_in_use(), 0);
    assert_eq!(registry.objects_in_use_total(), 0);
}

#[test]
fn test_multithread_exclusive_access() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);
    let num_threads = 8;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let pool = pool.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let tag = thread_id * 1_000_000 + i;
                    let mut obj = pool.get();
                    obj.fld1 = tag;
                    obj.bb.as_mut().unwrap().push(thread_id as u8);
                    thread::yield_now();
                    assert_eq!(obj.fld1, tag, "instance shared between live borrows");
                    assert_eq!(obj.bb.as_ref().unwrap().len(), 1);
                    obj.release();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(pool.objects_in_use(), 0);
    let stats = pool.stats();
    assert_eq!(stats.borrowed, 8 * 500);
    assert_eq!(stats.recycled + stats.discarded, stats.borrowed);
}

#[test]
fn test_dropped_handle_stays_counted() {
    let registry = Arc::new(Registry::new());
    let pool = buffered_pool(&registry, PoolMode::Pooled);

    drop(pool.get());
    assert_eq!(pool.objects_in_use(), 1);
    assert_eq!(registry.objects_in_use_total(), 1);
}

#[test]
fn test_registry_sums_all_pools() {
    let registry = Arc::new(Registry::new());
    let first = buffered_pool(&registry, PoolMode::Pooled);
    let second = buffered_pool(&registry, PoolMode::Stub);

    let mut a = first.get();
    let mut b = second.get();
    let mut c = second.get();
    assert_eq!(registry.counter_count(), 2);
    assert_eq!(registry.objects_in_use_total(), 3);

    a.release();
    b.release();
    c.release();
    assert_eq!(registry.objects_in_use_total(), 0);
}

#[test]
fn test_config_max_idle() {
    let registry = Arc::new(Registry::new());
    let pool = Pool::with_config(
        PoolConfig::default()
            .with_name("bounded")
            .with_max_idle(4)
            .with_registry(registry),
        |releaser| Buffered {
            releaser,
            bb: None,
            fld1: 0,
        },
    );

    let mut held: Vec<_> = (0..10).map(|_| pool.get()).collect();
    for obj in &mut held {
        obj.release();
    }

    let stats = pool.stats();
    assert_eq!(stats.name, "bounded");
    assert_eq!(stats.idle, 4);
    assert_eq!(stats.recycled, 4);
    assert_eq!(stats.discarded, 6);
}
