// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Hint cache size bound and FIFO eviction under randomized load

use hint_gateway::{
    hints::{cache_key, fallback::generate_fallback_hints, HintCache},
    utils::ManualClock,
};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn cache(max: usize, clock: &ManualClock) -> HintCache {
    HintCache::new(DAY, max, Arc::new(clock.clone()))
}

#[test]
fn test_matches_fifo_model_under_random_inserts() {
    let mut rng = rand::thread_rng();
    let clock = ManualClock::from_millis(1_700_000_000_000);

    for _ in 0..10 {
        let max = rng.gen_range(1..=16);
        let cache = cache(max, &clock);
        let mut model: VecDeque<String> = VecDeque::new();

        for _ in 0..400 {
            let word = format!("word{}", rng.gen_range(0..40));
            let key = cache_key(&word, "general", "en");
            cache.insert(&key, generate_fallback_hints(&word, "general"));

            if !model.contains(&key) {
                if model.len() >= max {
                    model.pop_front();
                }
                model.push_back(key);
            }

            assert!(cache.stats().total <= max);
        }

        assert_eq!(cache.keys_in_insertion_order(), Vec::from(model.clone()));
        for key in &model {
            assert!(cache.get(key).is_some());
        }
    }
}

#[test]
fn test_thousand_and_first_entry_evicts_the_first() {
    let clock = ManualClock::from_millis(1_700_000_000_000);
    let cache = cache(1000, &clock);

    for i in 0..1001 {
        let word = format!("w{}", i);
        cache.insert(&cache_key(&word, "food", "en"), generate_fallback_hints(&word, "food"));
    }

    let stats = cache.stats();
    assert_eq!(stats.total, 1000);
    assert_eq!(stats.max, 1000);
    assert!(cache.get(&cache_key("w0", "food", "en")).is_none());
    assert!(cache.get(&cache_key("w1", "food", "en")).is_some());
    assert!(cache.get(&cache_key("w1000", "food", "en")).is_some());
}

#[test]
fn test_reads_do_not_purge_expired_entries() {
    let clock = ManualClock::from_millis(1_700_000_000_000);
    let cache = cache(10, &clock);
    let key = cache_key("Pizza", "food", "en");

    cache.insert(&key, generate_fallback_hints("Pizza", "food"));
    clock.advance_millis(DAY.as_millis() as i64 - 1);
    assert!(cache.get(&key).is_some());

    clock.advance_millis(1);
    assert!(cache.get(&key).is_none());

    let stats = cache.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.expired, 1);

    cache.cleanup_expired();
    assert_eq!(cache.stats().total, 0);
}
