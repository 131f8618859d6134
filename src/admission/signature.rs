// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request signatures and the replay window
//!
//! Clients sign `word:topic:timestamp` with HMAC-SHA256 under the shared app
//! secret and send the lowercase hex digest in `X-Signature`, with the
//! millisecond timestamp in `X-Timestamp`.
//!
//! The timestamp only bounds how long a captured request stays usable
//! (±tolerance around the verifier's clock). Signatures seen inside that
//! window are not remembered, so a captured request can be replayed until it
//! ages out.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

use super::types::AdmissionError;
use crate::utils::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Verifies `X-Signature` / `X-Timestamp` pairs
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
    tolerance_ms: i64,
    clock: Arc<dyn Clock>,
}

impl SignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>, tolerance_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            tolerance_ms: i64::try_from(tolerance_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Lowercase hex HMAC-SHA256 of `word:topic:timestamp`
    pub fn generate_signature(&self, word: &str, topic: &str, timestamp: &str) -> String {
        sign(&self.secret, word, topic, timestamp)
    }

    /// True when `timestamp` is an integer millisecond value within the
    /// tolerance of the verifier's clock
    pub fn is_timestamp_valid(&self, timestamp: &str) -> bool {
        match timestamp.parse::<i64>() {
            Ok(request_time) => {
                let now = self.clock.now_millis();
                now.abs_diff(request_time) <= self.tolerance_ms.unsigned_abs()
            }
            Err(_) => false,
        }
    }

    /// Exact, constant-time comparison against the recomputed signature
    pub fn verify_signature(&self, signature: &str, word: &str, topic: &str, timestamp: &str) -> bool {
        let expected = self.generate_signature(word, topic, timestamp);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    /// Runs the replay window check, then the signature check
    pub fn check(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        word: &str,
        topic: &str,
    ) -> Result<(), AdmissionError> {
        let (signature, timestamp) = match (signature, timestamp) {
            (Some(s), Some(t)) if !s.is_empty() && !t.is_empty() => (s, t),
            _ => return Err(AdmissionError::MissingSignature),
        };

        if !self.is_timestamp_valid(timestamp) {
            debug!("Rejecting request with stale timestamp {}", timestamp);
            return Err(AdmissionError::ExpiredRequest);
        }

        if !self.verify_signature(signature, word, topic, timestamp) {
            return Err(AdmissionError::InvalidSignature);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_ms", &self.tolerance_ms)
            .finish()
    }
}

/// Signs a request the way clients are expected to
pub fn sign(secret: &[u8], word: &str, topic: &str, timestamp: &str) -> String {
    // HMAC accepts keys of any length, so this never fails
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(format!("{}:{}:{}", word, topic, timestamp).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
