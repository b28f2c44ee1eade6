//! Hammers a sharded LRU and a guarded LRU from several threads.
//!
//! Run with: cargo run --example sharded_threads

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use hotcache::builder::{CacheBuilder, Policy};
use hotcache::traits::ConcurrentCache;

const THREADS: usize = 8;
const OPS: usize = 50_000;

fn run<C: ConcurrentCache<usize> + 'static>(name: &str, cache: Arc<C>) {
    let start = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS {
                    let key = format!("key-{}", (i * 31 + t) % 4096);
                    if i % 4 == 0 {
                        cache.insert(key, i);
                    } else {
                        cache.get(&key);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
    println!(
        "{name:>12}: {} entries after {} ops in {:?}",
        cache.len(),
        THREADS * OPS,
        start.elapsed()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .compact()
        .init();

    let sharded = match CacheBuilder::<usize>::new()
        .shard_count(16)
        .max_entries_per_shard(128)
        .build_sharded()
    {
        Ok(cache) => Arc::new(cache),
        Err(err) => {
            eprintln!("bad config: {err}");
            return;
        },
    };
    run("sharded", Arc::clone(&sharded));
    println!("{:>12}  per-shard lengths {:?}", "", sharded.shard_lens());

    let guarded = Arc::new(
        CacheBuilder::new()
            .max_bytes(2048)
            .build_guarded(Policy::Lru, |_: &usize| 1),
    );
    run("guarded", Arc::clone(&guarded));
    let stats = guarded.stats();
    println!(
        "{:>12}  {} lookups, hit rate {:.2}",
        "",
        stats.lookups,
        stats.hit_rate()
    );

    // Hits log at debug, misses at trace.
    let traced = CacheBuilder::new()
        .max_bytes(16)
        .trace_lookups("demo")
        .build_guarded(Policy::Lfu, |_: &usize| 1);
    traced.insert("answer".to_string(), 42);
    traced.get("answer");
    traced.get("question");

    // Routing fails for shard counts that are not powers of two.
    if let Err(err) = CacheBuilder::<usize>::new().shard_count(12).build_sharded() {
        println!("shard_count(12): {err}");
    }
}
