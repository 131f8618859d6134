// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sliding-window request ceiling per identity
//!
//! Each identity keeps the timestamps of its admitted requests inside the
//! trailing window. Unlike fixed buckets, a burst straddling a bucket boundary
//! cannot get twice the ceiling through.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::types::{Identity, RateDecision};
use crate::utils::Clock;

/// Admitted-request timestamps (epoch millis) for one identity
#[derive(Debug, Default)]
pub struct SlidingWindow {
    requests: VecDeque<i64>,
}

impl SlidingWindow {
    /// Drop timestamps at or before `now - window_ms`
    fn cleanup(&mut self, now: i64, window_ms: i64) {
        let window_start = now - window_ms;
        while let Some(&front) = self.requests.front() {
            if front <= window_start {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_acquire(&mut self, now: i64, window_ms: i64, max_requests: usize) -> RateDecision {
        self.cleanup(now, window_ms);

        if self.requests.len() >= max_requests {
            let oldest = self.requests.front().copied().unwrap_or(now);
            let wait_ms = (oldest + window_ms - now).max(1);
            let retry_after = (wait_ms as u64).div_ceil(1000);
            return RateDecision::reject(retry_after);
        }

        self.requests.push_back(now);
        RateDecision::admit()
    }

    pub fn current_count(&self) -> usize {
        self.requests.len()
    }
}

/// Per-identity sliding-window limiter
pub struct IdentityRateLimiter {
    windows: Mutex<HashMap<Identity, SlidingWindow>>,
    window_ms: i64,
    max_requests: usize,
    clock: Arc<dyn Clock>,
}

impl IdentityRateLimiter {
    /// # Arguments
    /// * `window` - Length of the trailing window
    /// * `max_requests` - Requests admitted per identity inside any window
    pub fn new(window: Duration, max_requests: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            max_requests,
            clock,
        }
    }

    /// Admit and record the request, or report when the oldest counted
    /// request leaves the window
    pub async fn check_rate_limit(&self, identity: &Identity) -> RateDecision {
        let now = self.clock.now_millis();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(identity.clone()).or_default();
        let decision = window.try_acquire(now, self.window_ms, self.max_requests);

        if !decision.allowed {
            debug!(
                "Rate limit hit for {} ({} in window)",
                identity,
                window.current_count()
            );
        }

        decision
    }

    /// Requests currently counted for an identity
    pub async fn current_count(&self, identity: &Identity) -> usize {
        let now = self.clock.now_millis();
        let mut windows = self.windows.lock().await;
        match windows.get_mut(identity) {
            Some(window) => {
                window.cleanup(now, self.window_ms);
                window.current_count()
            }
            None => 0,
        }
    }

    /// Drop identities with no requests left in their window
    pub async fn cleanup_idle(&self) {
        let now = self.clock.now_millis();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, window| {
            window.cleanup(now, self.window_ms);
            window.current_count() > 0
        });
    }

    pub async fn tracked_identities(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}
