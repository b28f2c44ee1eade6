// ==============================================
// CROSS-POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Behavior every byte-budgeted policy must share, plus the per-policy
// ordering guarantees, exercised through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hotcache::builder::{CacheBuilder, Policy, PolicyCache};
use hotcache::traits::Cache;

const POLICIES: [Policy; 3] = [Policy::Fifo, Policy::Lru, Policy::Lfu];

fn five_bytes(_: &u32) -> usize {
    5
}

fn value_bytes(value: &u32) -> usize {
    *value as usize
}

type Recorded = Arc<Mutex<Vec<(String, u32)>>>;

fn recording_cache(
    policy: Policy,
    max_bytes: usize,
) -> (PolicyCache<u32, fn(&u32) -> usize>, Recorded) {
    let evicted: Recorded = Arc::default();
    let sink = Arc::clone(&evicted);
    let cache = CacheBuilder::new()
        .max_bytes(max_bytes)
        .listener(move |k, v| sink.lock().unwrap().push((k, v)))
        .build(policy, five_bytes as fn(&u32) -> usize);
    (cache, evicted)
}

// ==============================================
// Callback Correctness
// ==============================================

mod callback_correctness {
    use super::*;

    #[test]
    fn third_insert_evicts_exactly_one_entry() {
        for policy in POLICIES {
            let (mut cache, evicted) = recording_cache(policy, 10);

            cache.insert("a".into(), 1);
            cache.insert("b".into(), 2);
            assert_eq!(cache.len(), 2, "{policy:?}");
            assert!(evicted.lock().unwrap().is_empty(), "{policy:?}");

            cache.insert("c".into(), 3);
            assert_eq!(
                *evicted.lock().unwrap(),
                vec![("a".to_string(), 1)],
                "{policy:?}"
            );
            assert_eq!(cache.len(), 2, "{policy:?}");
            assert_eq!(cache.used_bytes(), 10, "{policy:?}");
        }
    }

    #[test]
    fn update_in_place_never_notifies() {
        for policy in POLICIES {
            let (mut cache, evicted) = recording_cache(policy, 10);
            cache.insert("a".into(), 1);
            cache.insert("a".into(), 2);
            cache.insert("a".into(), 3);
            assert!(evicted.lock().unwrap().is_empty(), "{policy:?}");
            assert_eq!(cache.peek("a"), Some(&3), "{policy:?}");
        }
    }

    fn weighted_cache(
        policy: Policy,
        max_bytes: usize,
    ) -> (PolicyCache<u32, fn(&u32) -> usize>, Recorded) {
        let evicted: Recorded = Arc::default();
        let sink = Arc::clone(&evicted);
        let cache = CacheBuilder::new()
            .max_bytes(max_bytes)
            .listener(move |k, v| sink.lock().unwrap().push((k, v)))
            .build(policy, value_bytes as fn(&u32) -> usize);
        (cache, evicted)
    }

    #[test]
    fn oversized_entry_is_reported_and_dropped_alone() {
        for policy in POLICIES {
            let (mut cache, evicted) = weighted_cache(policy, 100);
            for i in 0..10 {
                cache.insert(format!("k{i}"), 10);
            }
            for i in 0..10 {
                cache.get(&format!("k{i}"));
            }

            cache.insert("huge".into(), 101);

            assert_eq!(cache.len(), 10, "{policy:?}");
            assert_eq!(cache.used_bytes(), 100, "{policy:?}");
            assert!(!cache.contains("huge"), "{policy:?}");
            assert_eq!(
                *evicted.lock().unwrap(),
                vec![("huge".to_string(), 101)],
                "{policy:?}"
            );
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn oversized_update_drops_only_that_key() {
        for policy in POLICIES {
            let (mut cache, evicted) = weighted_cache(policy, 8);
            cache.insert("small".into(), 3);
            cache.insert("grown".into(), 4);

            assert_eq!(cache.insert("grown".into(), 9), Some(4), "{policy:?}");

            assert_eq!(cache.len(), 1, "{policy:?}");
            assert!(cache.contains("small"), "{policy:?}");
            assert_eq!(cache.used_bytes(), 3, "{policy:?}");
            assert_eq!(
                *evicted.lock().unwrap(),
                vec![("grown".to_string(), 9)],
                "{policy:?}"
            );
        }
    }
}

// ==============================================
// Lookup Semantics
// ==============================================

mod lookups {
    use super::*;

    #[test]
    fn repeated_get_is_idempotent() {
        for policy in POLICIES {
            let (mut cache, _) = recording_cache(policy, 0);
            cache.insert("a".into(), 7);
            cache.insert("b".into(), 8);

            let (len, used) = (cache.len(), cache.used_bytes());
            let first = cache.get("a").copied();
            let second = cache.get("a").copied();
            assert_eq!(first, Some(7), "{policy:?}");
            assert_eq!(first, second, "{policy:?}");
            assert_eq!(cache.len(), len, "{policy:?}");
            assert_eq!(cache.used_bytes(), used, "{policy:?}");
            assert_eq!(cache.get("missing"), None, "{policy:?}");
            assert_eq!(cache.used_bytes(), used, "{policy:?}");
        }
    }

    #[test]
    fn repeated_get_keeps_weighted_accounting() {
        for policy in POLICIES {
            let mut cache = CacheBuilder::new()
                .max_bytes(20)
                .build(policy, value_bytes as fn(&u32) -> usize);
            cache.insert("a".into(), 7);
            cache.insert("b".into(), 11);
            assert_eq!(cache.used_bytes(), 18, "{policy:?}");

            for _ in 0..5 {
                assert_eq!(cache.get("a"), Some(&7), "{policy:?}");
                assert_eq!(cache.get("b"), Some(&11), "{policy:?}");
            }
            assert_eq!(cache.len(), 2, "{policy:?}");
            assert_eq!(cache.used_bytes(), 18, "{policy:?}");
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn remove_and_evict_on_empty_are_noops() {
        for policy in POLICIES {
            let (mut cache, evicted) = recording_cache(policy, 0);
            assert!(!cache.remove("nothing"), "{policy:?}");
            assert!(!cache.evict_oldest(), "{policy:?}");
            assert!(evicted.lock().unwrap().is_empty(), "{policy:?}");
        }
    }
}

// ==============================================
// Per-Policy Ordering
// ==============================================

mod ordering {
    use super::*;

    #[test]
    fn fifo_evicts_first_inserted_despite_reads() {
        let (mut cache, _) = recording_cache(Policy::Fifo, 10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.get("a");
        cache.insert("c".into(), 3);

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn fifo_update_moves_key_behind_later_inserts() {
        let (mut cache, evicted) = recording_cache(Policy::Fifo, 10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("a".into(), 10);
        cache.insert("c".into(), 3);

        assert_eq!(*evicted.lock().unwrap(), vec![("b".to_string(), 2)]);
        assert_eq!(cache.peek("a"), Some(&10));
    }

    #[test]
    fn lru_evicts_least_recently_read() {
        let (mut cache, _) = recording_cache(Policy::Lru, 10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.get("a");
        cache.insert("c".into(), 3);

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn lfu_evicts_lowest_weight() {
        let (mut cache, _) = recording_cache(Policy::Lfu, 10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.get("a");
        cache.get("a");
        cache.get("b");
        cache.insert("c".into(), 3);

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn evict_oldest_follows_each_policy() {
        let mut victims = Vec::new();
        for policy in POLICIES {
            let (mut cache, evicted) = recording_cache(policy, 0);
            cache.insert("a".into(), 1);
            cache.insert("b".into(), 2);
            cache.insert("c".into(), 3);
            cache.get("a");
            cache.get("a");
            cache.get("b");
            cache.insert("c".into(), 30);

            assert!(cache.evict_oldest());
            victims.push(evicted.lock().unwrap()[0].0.clone());
        }
        // FIFO: a is still first in line. LRU: a was read before b and c.
        // LFU: b (1 hit) and c (1 update) tie; b was touched earlier.
        assert_eq!(victims, vec!["a", "a", "b"]);
    }
}

// ==============================================
// Property Tests
// ==============================================

mod property_tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, u32),
        Get(u8),
        Peek(u8),
        Remove(u8),
        EvictOldest,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..24, 0u32..20).prop_map(|(k, v)| Op::Insert(k, v)),
            3 => (0u8..24).prop_map(Op::Get),
            1 => (0u8..24).prop_map(Op::Peek),
            1 => (0u8..24).prop_map(Op::Remove),
            1 => Just(Op::EvictOldest),
        ]
    }

    fn policy_strategy() -> impl Strategy<Value = Policy> {
        prop_oneof![Just(Policy::Fifo), Just(Policy::Lru), Just(Policy::Lfu)]
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_budget_and_accounting_hold(
            policy in policy_strategy(),
            max_bytes in 0usize..60,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let removed = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&removed);
            let mut cache = CacheBuilder::new()
                .max_bytes(max_bytes)
                .listener(move |_, _| { counter.fetch_add(1, Ordering::Relaxed); })
                .build(policy, value_bytes as fn(&u32) -> usize);
            let mut admitted = 0usize;

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        if cache.insert(k.to_string(), v).is_none() {
                            admitted += 1;
                        }
                    },
                    Op::Get(k) => { cache.get(&k.to_string()); },
                    Op::Peek(k) => { cache.peek(&k.to_string()); },
                    Op::Remove(k) => { cache.remove(&k.to_string()); },
                    Op::EvictOldest => { cache.evict_oldest(); },
                }

                prop_assert!(cache.check_invariants().is_ok());
                if max_bytes > 0 {
                    prop_assert!(cache.used_bytes() <= max_bytes);
                }
                prop_assert_eq!(admitted - removed.load(Ordering::Relaxed), cache.len());
            }
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_get_matches_last_insert(
            policy in policy_strategy(),
            writes in prop::collection::vec((0u8..8, 0u32..1000), 1..50)
        ) {
            let mut cache = CacheBuilder::new()
                .max_bytes(0)
                .build(policy, five_bytes as fn(&u32) -> usize);
            let mut model = std::collections::HashMap::new();
            for (k, v) in writes {
                cache.insert(k.to_string(), v);
                model.insert(k.to_string(), v);
            }
            prop_assert_eq!(cache.len(), model.len());
            for (k, v) in &model {
                prop_assert_eq!(cache.get(k), Some(v));
            }
        }
    }
}
