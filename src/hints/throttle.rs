// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide budget for outbound provider calls

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::HintError;

const DEFAULT_CALLS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(300) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Caps how often the orchestrator may call the provider
pub struct ProviderThrottle {
    limiter: Arc<GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    calls_per_minute: u32,
}

impl ProviderThrottle {
    /// Create a new throttle
    ///
    /// # Arguments
    /// * `calls_per_minute` - Maximum provider calls per minute (0 means the default of 300)
    pub fn new(calls_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(calls_per_minute).unwrap_or(DEFAULT_CALLS_PER_MINUTE);
        let limiter = Arc::new(GovRateLimiter::direct(Quota::per_minute(rpm)));

        Self {
            limiter,
            calls_per_minute: rpm.get(),
        }
    }

    /// Take one call from the budget
    pub fn check(&self) -> Result<(), HintError> {
        self.limiter.check().map_err(|_| HintError::Throttled)
    }

    pub fn calls_per_minute(&self) -> u32 {
        self.calls_per_minute
    }
}
