//! Teardown releases every allocation the tree made.
//!
//! Kept in its own test binary with a single test: the counting allocator is
//! process-wide, so concurrent tests would skew the numbers.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, Ordering};

use tldtally::domain::{Date, TldTree};

struct CountingAllocator;

static LIVE_BYTES: AtomicIsize = AtomicIsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size() as isize, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        LIVE_BYTES.fetch_sub(layout.size() as isize, Ordering::SeqCst);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            LIVE_BYTES.fetch_add(new_size as isize - layout.size() as isize, Ordering::SeqCst);
        }
        new_ptr
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn live() -> isize {
    LIVE_BYTES.load(Ordering::SeqCst)
}

fn build_and_destroy(n: usize, explicit: bool) {
    let begin = Date::new(1, 1, 2020).unwrap();
    let end = Date::new(31, 1, 2020).unwrap();
    let day = Date::new(15, 1, 2020).unwrap();

    let mut tree = TldTree::new(begin, end);
    let mut host = String::with_capacity(32);
    for i in 0..n {
        for _ in 0..3 {
            host.clear();
            host.push_str("www.example.k");
            host.push_str(&i.to_string());
            tree.add(&host, &day).unwrap();
        }
        // Duplicate key and a rejected hostname must not leak either
        tree.add("nosep", &day).unwrap_err();
    }
    assert_eq!(tree.len(), n);
    if explicit {
        assert_eq!(tree.destroy(), n);
    } else {
        drop(tree);
    }
}

#[test]
fn given_trees_of_various_sizes_when_torn_down_then_no_bytes_remain() {
    // Warm-up: one-time lazy statics (tracing callsites) allocate on first use
    build_and_destroy(4, true);
    build_and_destroy(4, false);

    for n in [0usize, 1, 2, 17, 300] {
        for explicit in [true, false] {
            let before = live();
            build_and_destroy(n, explicit);
            let after = live();
            assert_eq!(
                before, after,
                "leaked {} bytes for n={} explicit={}",
                after - before,
                n,
                explicit
            );
        }
    }
}
