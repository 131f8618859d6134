// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Daily quota behaviour across calendar days

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use hint_gateway::{admission::DeviceQuotaTracker, utils::ManualClock};
use rand::Rng;
use std::sync::Arc;

#[tokio::test]
async fn test_never_exceeds_limit_on_any_day() {
    let mut rng = rand::thread_rng();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    let limit = 7;
    let tracker = DeviceQuotaTracker::new(limit, FixedOffset::east_opt(0), Arc::new(clock.clone()));

    let mut per_day = std::collections::HashMap::new();
    for _ in 0..2_000 {
        clock.advance(Duration::minutes(rng.gen_range(0..30)));
        if tracker.check_device_limit("device").await.allowed {
            let day = hint_gateway::utils::Clock::now(&clock).date_naive();
            *per_day.entry(day).or_insert(0u32) += 1;
        }
    }

    assert!(per_day.len() > 1);
    assert!(per_day.values().all(|&count| count <= limit));
}

#[tokio::test]
async fn test_exhausted_device_admitted_after_local_midnight() {
    // UTC+09:00: local midnight is 15:00 UTC
    let offset = FixedOffset::east_opt(9 * 3600);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 14, 0, 0).unwrap());
    let tracker = DeviceQuotaTracker::new(2, offset, Arc::new(clock.clone()));

    assert!(tracker.check_device_limit("d").await.allowed);
    assert!(tracker.check_device_limit("d").await.allowed);

    let rejected = tracker.check_device_limit("d").await;
    assert!(!rejected.allowed);
    assert_eq!(
        rejected.remaining_time,
        Some(std::time::Duration::from_secs(3600))
    );

    clock.advance(Duration::hours(1));
    assert!(tracker.check_device_limit("d").await.allowed);
    // The previous day's key was swept when today's key was created
    assert_eq!(tracker.tracked_keys().await, 1);
}
