// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Daily request ceiling per device
//!
//! Counts are keyed by (device id, local calendar date). A new day produces a
//! new key rather than resetting the old one; keys from earlier days are swept
//! whenever a new key is created, so memory stays around active devices x 2
//! days without a background task.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::QuotaDecision;
use crate::utils::Clock;

/// Tracks per-device request counts for the current calendar day
pub struct DeviceQuotaTracker {
    counts: Mutex<HashMap<(String, NaiveDate), u32>>,
    daily_limit: u32,
    offset: Option<FixedOffset>,
    clock: Arc<dyn Clock>,
}

impl DeviceQuotaTracker {
    /// # Arguments
    /// * `daily_limit` - Requests allowed per device per calendar day
    /// * `offset` - Timezone offset defining calendar days; `None` follows the
    ///   host's zone, resolved at each check so DST changes apply
    pub fn new(daily_limit: u32, offset: Option<FixedOffset>, clock: Arc<dyn Clock>) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            daily_limit,
            offset,
            clock,
        }
    }

    /// Admit and count the request, or report the time left until midnight
    pub async fn check_device_limit(&self, device_id: &str) -> QuotaDecision {
        let now = self.clock.now();
        let local = now.with_timezone(&self.offset_at(now));
        let today = local.date_naive();
        let key = (device_id.to_string(), today);

        let mut counts = self.counts.lock().await;

        if !counts.contains_key(&key) {
            let before = counts.len();
            counts.retain(|(_, day), _| *day == today);
            if counts.len() < before {
                debug!("Swept {} stale quota entries", before - counts.len());
            }
        }

        let count = counts.entry(key).or_insert(0);
        if *count >= self.daily_limit {
            let remaining = time_until_midnight(local.naive_local(), today);
            info!(
                "Device {} reached daily limit of {} requests",
                device_id, self.daily_limit
            );
            return QuotaDecision::reject(remaining);
        }

        *count += 1;
        QuotaDecision::admit()
    }

    /// Requests counted today for a device
    pub async fn used_today(&self, device_id: &str) -> u32 {
        let now = self.clock.now();
        let today = now.with_timezone(&self.offset_at(now)).date_naive();
        self.counts
            .lock()
            .await
            .get(&(device_id.to_string(), today))
            .copied()
            .unwrap_or(0)
    }

    /// Number of (device, day) keys currently held
    pub async fn tracked_keys(&self) -> usize {
        self.counts.lock().await.len()
    }

    fn offset_at(&self, now: DateTime<Utc>) -> FixedOffset {
        self.offset
            .unwrap_or_else(|| Local.offset_from_utc_datetime(&now.naive_utc()))
    }
}

fn time_until_midnight(now: NaiveDateTime, today: NaiveDate) -> Duration {
    let next_midnight = today
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0));
    next_midnight
        .and_then(|midnight| (midnight - now).to_std().ok())
        .unwrap_or(Duration::ZERO)
}
