// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Concurrent requests through the full pipeline

use chrono::{TimeZone, Utc};
use hint_gateway::{
    admission::{sign, AdmissionError, HintPipeline, PipelineError, RequestCredentials},
    config::HintServiceConfig,
    utils::{Clock, ManualClock},
};
use serde_json::json;
use std::sync::Arc;

const SECRET: &str = "concurrency-secret";

fn setup(config: HintServiceConfig) -> (Arc<HintPipeline>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap());
    let pipeline = HintPipeline::new(&config, None, None, Arc::new(clock.clone()));
    (Arc::new(pipeline), clock)
}

fn credentials(clock: &ManualClock, client: &str) -> RequestCredentials {
    let timestamp = clock.now_millis().to_string();
    RequestCredentials {
        app_secret: Some(SECRET.to_string()),
        signature: Some(sign(SECRET.as_bytes(), "Pizza", "food", &timestamp)),
        timestamp: Some(timestamp),
        authorization: None,
        client_addr: client.to_string(),
    }
}

fn base_config() -> HintServiceConfig {
    HintServiceConfig {
        app_secret: SECRET.to_string(),
        quota_utc_offset_minutes: Some(0),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_admits_exactly_the_ceiling() {
    let (pipeline, clock) = setup(base_config());
    let body = json!({"word": "Pizza", "topic": "food"}).to_string();

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let pipeline = pipeline.clone();
            let credentials = credentials(&clock, "203.0.113.50");
            let body = body.clone();
            tokio::spawn(async move { pipeline.handle(&credentials, body.as_bytes()).await })
        })
        .collect();

    let mut admitted = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(PipelineError::Rejected(AdmissionError::RateLimitExceeded { .. })) => limited += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(admitted, 15);
    assert_eq!(limited, 85);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_device_quota_is_exact() {
    let mut config = base_config();
    config.daily_device_limit = 25;
    config.rate_limit.max_requests = 1000;
    let (pipeline, clock) = setup(config);
    let body = json!({"word": "Pizza", "topic": "food", "deviceId": "shared-device"}).to_string();

    let handles: Vec<_> = (0..80)
        .map(|i| {
            let pipeline = pipeline.clone();
            let credentials = credentials(&clock, &format!("10.1.0.{}", i));
            let body = body.clone();
            tokio::spawn(async move { pipeline.handle(&credentials, body.as_bytes()).await })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 25);
    assert_eq!(pipeline.quota().used_today("shared-device").await, 25);
}
