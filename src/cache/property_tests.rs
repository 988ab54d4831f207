//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's expiry and overwrite behavior against
//! an explicit clock.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::{ttl, CacheStore};
use crate::error::CacheError;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

/// Generates TTLs between 1ms and 10s
fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (1u64..10_000).prop_map(Duration::from_millis)
}

/// A sequence of cache operations, each after a clock advance in milliseconds
#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: String, value: String, ttl: Duration },
    Get { key: String },
    Sweep,
}

fn cache_op_strategy() -> impl Strategy<Value = (u64, CacheOp)> {
    let op = prop_oneof![
        (key_strategy(), value_strategy(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Add { key, value, ttl }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        Just(CacheOp::Sweep),
    ];
    (0u64..3_000, op)
}

/// Reference model: key -> (value, ttl, last access)
type Model = HashMap<String, (String, Duration, DateTime<Utc>)>;

fn model_expired(ttl: Duration, last_access: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_access > TimeDelta::from_std(ttl).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of adds, gets and sweeps under an advancing clock, the
    // store agrees with a simple model: a get hits iff the key was added and
    // no more than its TTL has passed since the last add or hit.
    #[test]
    fn prop_store_matches_sliding_window_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let mut store = CacheStore::new();
        let mut model: Model = HashMap::new();
        let mut now = Utc::now();

        for (advance_ms, op) in ops {
            now += TimeDelta::milliseconds(advance_ms as i64);
            match op {
                CacheOp::Add { key, value, ttl } => {
                    store.add_at(key.clone(), value.clone(), ttl, now);
                    model.insert(key, (value, ttl, now));
                }
                CacheOp::Get { key } => {
                    let result = store.get_at(&key, now);
                    match model.get_mut(&key) {
                        None => prop_assert!(matches!(result, Err(CacheError::NotFound(_)))),
                        Some((_, ttl, last)) if model_expired(*ttl, *last, now) => {
                            prop_assert!(matches!(result, Err(CacheError::Expired(_))));
                        }
                        Some((value, _, last)) => {
                            prop_assert_eq!(result.unwrap(), value.clone());
                            *last = now;
                        }
                    }
                }
                CacheOp::Sweep => {
                    let removed = store.cleanup_expired_at(now);
                    let before = model.len();
                    model.retain(|_, (_, ttl, last)| !model_expired(*ttl, *last, now));
                    prop_assert_eq!(removed, before - model.len());
                }
            }
            prop_assert_eq!(store.len(), model.len());
        }
    }

    // Overwriting a key always yields the latest value, under the latest TTL.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy(),
        ttl1 in ttl_strategy(),
        ttl2 in ttl_strategy(),
        gap_ms in 0u64..20_000
    ) {
        let start = Utc::now();
        let mut store = CacheStore::new();

        store.add_at(key.clone(), value1, ttl1, start);
        let second = start + TimeDelta::milliseconds(gap_ms as i64);
        store.add_at(key.clone(), value2.clone(), ttl2, second);

        prop_assert_eq!(store.len(), 1);

        let deadline = second + TimeDelta::from_std(ttl2).unwrap();
        prop_assert_eq!(store.get_at(&key, deadline).unwrap(), value2);

        let past = deadline + TimeDelta::from_std(ttl2).unwrap() + TimeDelta::nanoseconds(1);
        prop_assert!(store.get_at(&key, past).is_err());
    }

    // A scan never mutates and reports exactly the keys a sweep removes.
    #[test]
    fn prop_scan_matches_sweep(
        entries in prop::collection::vec((key_strategy(), ttl_strategy()), 0..30),
        elapsed_ms in 0u64..12_000
    ) {
        let start = Utc::now();
        let mut store = CacheStore::new();
        for (key, ttl) in entries {
            store.add_at(key, (), ttl, start);
        }

        let now = start + TimeDelta::milliseconds(elapsed_ms as i64);
        let before = store.len();
        let scanned = store.scan_expired_at(now);
        prop_assert_eq!(store.len(), before);

        let removed = store.cleanup_expired_at(now);
        prop_assert_eq!(removed, scanned.len());
        for key in scanned {
            prop_assert!(matches!(store.get_at(&key, now), Err(CacheError::NotFound(_))));
        }
    }

    // Any whole number of milliseconds round-trips through the TTL parser.
    #[test]
    fn prop_parse_millis(ms in 0u64..1_000_000_000) {
        let parsed = ttl::parse_duration(&format!("{ms}ms")).unwrap();
        prop_assert_eq!(parsed, Duration::from_millis(ms));
    }
}
