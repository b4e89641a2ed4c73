//! Process-wide registry and shortcuts.
//!
//! Kept to a single test: everything here shares the global registry.

use ownpool::{Pool, Poolable, Releaser};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct Conn {
    releaser: Releaser,
}

impl Poolable for Conn {
    fn releaser(&self) -> &Releaser {
        &self.releaser
    }
}

#[test]
fn test_global_registry() {
    std::env::set_var(ownpool::DEBUG_ENV_VAR, "1");
    ownpool::init_from_env();
    assert!(ownpool::is_debug_mode());

    let baseline = ownpool::objects_in_use_total();

    let external = Arc::new(AtomicU64::new(0));
    let seen = external.clone();
    ownpool::register_objects_in_use_counter(move || seen.load(Ordering::Relaxed));

    let pool = Pool::new(|releaser| Conn { releaser });
    let stub = Pool::stub(|releaser| Conn { releaser });

    let mut a = pool.get();
    let mut b = stub.get();
    external.store(5, Ordering::Relaxed);
    assert_eq!(ownpool::objects_in_use_total(), baseline + 7);

    let mut out = Vec::new();
    ownpool::print_non_released(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("1 not released borrowed at:"));
    assert!(report.contains(file!()));

    a.release();
    b.release();
    external.store(0, Ordering::Relaxed);
    assert_eq!(ownpool::objects_in_use_total(), baseline);

    let mut out = Vec::new();
    ownpool::print_non_released(&mut out).unwrap();
    assert!(out.is_empty());

    ownpool::set_debug_mode(false);
    assert!(!ownpool::is_debug_mode());
}
