//! Walks through the three byte-budgeted policies.
//!
//! Run with: cargo run --example basic_policies

use hotcache::builder::{CacheBuilder, Policy};
use hotcache::traits::Cache;

fn main() {
    println!("=== Byte-budgeted Policies ===\n");

    for policy in [Policy::Fifo, Policy::Lru, Policy::Lfu] {
        println!("{policy:?} cache, 12 byte budget");
        let mut cache = CacheBuilder::new()
            .max_bytes(12)
            .listener(|key, value: String| println!("   evicted {key} ({} bytes)", value.len()))
            .build(policy, |v: &String| v.len());

        cache.insert("a".into(), "aaaa".into());
        cache.insert("b".into(), "bbbb".into());
        cache.insert("c".into(), "cccc".into());

        // Reads promote "a" under LRU and raise its weight under LFU.
        cache.get("a");
        cache.get("a");

        // Needs 4 more bytes, so one entry goes.
        cache.insert("d".into(), "dddd".into());

        for key in ["a", "b", "c", "d"] {
            println!("   contains {key}? {}", cache.contains(key));
        }
        println!("   used {} of {} bytes\n", cache.used_bytes(), cache.max_bytes());
    }

    println!("Oversized value");
    let mut cache = CacheBuilder::new()
        .max_bytes(8)
        .build(Policy::Lru, |v: &String| v.len());
    cache.insert("small".into(), "tiny".into());
    cache.insert("big".into(), "far too large".into());
    // Only the oversized entry is dropped.
    println!(
        "   contains small? {}  contains big? {}",
        cache.contains("small"),
        cache.contains("big")
    );
}
