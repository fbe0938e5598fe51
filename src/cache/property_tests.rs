//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's invariants over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::ScanCache;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;

// == Strategies ==
/// Generates barcode-like keys (non-empty)
fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,12}"
}

/// Small key space so sequences revisit keys
fn hot_key_strategy() -> impl Strategy<Value = String> {
    "[a-e]"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (hot_key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        hot_key_strategy().prop_map(|key| CacheOp::Get { key }),
        hot_key_strategy().prop_map(|key| CacheOp::Has { key }),
        hot_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn new_cache(max_size: usize) -> ScanCache<u32> {
    ScanCache::with_max_size(max_size).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, hit and miss counters match what `get` returned,
    // and `has`/`delete` never count as lookups.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = new_cache(3);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key, value, None).unwrap();
                }
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Has { key } => {
                    cache.has(&key);
                }
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                }
            }
        }

        let stats = cache.stats();
        let total = expected_hits + expected_misses;
        prop_assert_eq!(stats.hit_count, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.miss_count, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_lookups, total);
        prop_assert_eq!(stats.size, cache.len(), "Size mismatch");
        if total == 0 {
            prop_assert_eq!(stats.hit_rate, 0.0);
        } else {
            prop_assert!((stats.hit_rate - expected_hits as f64 / total as f64).abs() < 1e-9);
        }
    }

    // For any sequence of sets, size never exceeds max_size.
    #[test]
    fn prop_capacity_enforcement(
        max_size in 1usize..20,
        entries in prop::collection::vec((key_strategy(), any::<u32>()), 1..200)
    ) {
        let mut cache = new_cache(max_size);

        for (key, value) in entries {
            cache.set(key, value, None).unwrap();
            prop_assert!(
                cache.len() <= max_size,
                "Cache size {} exceeds max {}",
                cache.len(),
                max_size
            );
        }
    }

    // Overwriting a key keeps the size and returns the latest value.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in any::<u32>(),
        value2 in any::<u32>()
    ) {
        let mut cache = new_cache(TEST_MAX_SIZE);

        cache.set(key.clone(), value1, None).unwrap();
        let size_before = cache.len();
        cache.set(key.clone(), value2, None).unwrap();

        prop_assert_eq!(cache.len(), size_before);
        prop_assert_eq!(cache.get(&key), Some(value2));
    }

    // Filling to capacity then inserting a new key evicts exactly the first key,
    // unless it was read in between, in which case the second key goes.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(key_strategy(), 3..10),
        touch_first in any::<bool>(),
        new_key in key_strategy()
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));

        let mut cache = new_cache(unique_keys.len());
        for (i, key) in unique_keys.iter().enumerate() {
            cache.set(key.clone(), i as u32, None).unwrap();
        }

        if touch_first {
            cache.get(&unique_keys[0]);
        }
        let expected_evicted = if touch_first { &unique_keys[1] } else { &unique_keys[0] };

        cache.set(new_key.clone(), 0, None).unwrap();

        prop_assert_eq!(cache.len(), unique_keys.len());
        prop_assert!(!cache.has(expected_evicted), "'{}' should have been evicted", expected_evicted);
        prop_assert!(cache.has(&new_key));
        for key in unique_keys.iter().filter(|k| *k != expected_evicted) {
            prop_assert!(cache.has(key), "'{}' should still be cached", key);
        }
        prop_assert_eq!(cache.stats().evictions, 1);
    }

    // Importing an export into a cache at least as large reproduces keys, order and values.
    #[test]
    fn prop_export_import_roundtrip(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        extra in 0usize..5
    ) {
        let mut source = new_cache(4);
        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    source.set(key, value, None).unwrap();
                }
                CacheOp::Get { key } => {
                    source.get(&key);
                }
                CacheOp::Has { key } => {
                    source.has(&key);
                }
                CacheOp::Delete { key } => {
                    source.delete(&key);
                }
            }
        }

        let mut target = new_cache(4 + extra);
        target.import(source.export());

        prop_assert_eq!(target.keys(), source.keys());
        for key in source.keys() {
            prop_assert_eq!(target.get(&key), source.get(&key));
        }
    }
}
