// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! The admission pipeline in front of hint generation
//!
//! Stages run in a fixed order and the first rejection wins:
//! credential gate (or bearer token), body parse, signature, device quota,
//! rate limit, validation, cache, orchestrator. Only generated hints are
//! written back to the cache.

use chrono::FixedOffset;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::credential::CredentialGate;
use super::identity::{extract_bearer_token, IdentityError, IdentityVerifier};
use super::quota::DeviceQuotaTracker;
use super::rate_limiter::IdentityRateLimiter;
use super::signature::SignatureVerifier;
use super::types::{AdmissionError, Identity};
use super::validation::validate_input;
use crate::config::{AuthMode, HintServiceConfig};
use crate::hints::{cache_key, CacheStats, HintCache, HintGenerator, HintService, HintSet};
use crate::utils::Clock;

pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_LANGUAGE: &str = "en";

/// JSON body of a hint request
///
/// Every field is optional at the parse step; presence is enforced by
/// validation after the throttling stages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub word: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub language: Option<String>,
    pub device_id: Option<String>,
}

/// Transport-level facts about the caller
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    pub app_secret: Option<String>,
    pub signature: Option<String>,
    pub timestamp: Option<String>,
    pub authorization: Option<String>,
    pub client_addr: String,
}

/// A successful pass through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintOutcome {
    pub hints: HintSet,
    pub cached: bool,
    pub fallback: bool,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rejected(#[from] AdmissionError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Owns every piece of admission state for the process
pub struct HintPipeline {
    auth_mode: AuthMode,
    trust_proxy_headers: bool,
    credentials: CredentialGate,
    signatures: SignatureVerifier,
    identity: Option<Arc<dyn IdentityVerifier>>,
    quota: DeviceQuotaTracker,
    rate_limiter: IdentityRateLimiter,
    cache: HintCache,
    hints: HintService,
}

impl HintPipeline {
    pub fn new(
        config: &HintServiceConfig,
        generator: Option<Arc<dyn HintGenerator>>,
        identity: Option<Arc<dyn IdentityVerifier>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let offset = config
            .quota_utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60));

        if config.auth_mode == AuthMode::Bearer && identity.is_none() {
            warn!("Bearer auth mode without an identity verifier; every request will fail");
        }

        Self {
            auth_mode: config.auth_mode,
            trust_proxy_headers: config.trust_proxy_headers,
            credentials: CredentialGate::new(&config.app_secret),
            signatures: SignatureVerifier::new(
                &config.app_secret,
                config.timestamp_tolerance_secs,
                clock.clone(),
            ),
            identity,
            quota: DeviceQuotaTracker::new(config.daily_device_limit, offset, clock.clone()),
            rate_limiter: IdentityRateLimiter::new(
                Duration::from_secs(config.rate_limit.window_secs),
                config.effective_rate_limit(),
                clock.clone(),
            ),
            cache: HintCache::new(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_entries,
                clock,
            ),
            hints: HintService::new(generator, &config.generator),
        }
    }

    /// Run one request through every stage
    pub async fn handle(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<HintOutcome, PipelineError> {
        let user = match self.auth_mode {
            AuthMode::Signature => {
                self.credentials
                    .check(credentials.app_secret.as_deref())
                    .inspect_err(|_| {
                        info!("Rejected {}: bad app secret", credentials.client_addr)
                    })?;
                None
            }
            AuthMode::Bearer => Some(self.authenticate_bearer(credentials).await?),
        };

        let request = parse_body(body)?;
        let word = request.word.as_deref();
        let topic = request.topic.as_deref();

        if self.auth_mode == AuthMode::Signature {
            self.signatures
                .check(
                    credentials.signature.as_deref(),
                    credentials.timestamp.as_deref(),
                    word.unwrap_or_default(),
                    topic.unwrap_or_default(),
                )
                .inspect_err(|e| {
                    info!("Rejected {}: {}", credentials.client_addr, e.code())
                })?;
        }

        if let Some(device_id) = request
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            self.quota.check_device_limit(device_id).await.into_result()?;
        }

        let identity = match user {
            Some(uid) => Identity::User(uid),
            None => Identity::Address(credentials.client_addr.clone()),
        };
        self.rate_limiter
            .check_rate_limit(&identity)
            .await
            .into_result()
            .inspect_err(|_| info!("Rate limited {}", identity))?;

        let difficulty = request.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY);
        let language = request.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        if let Some(message) = validate_input(word, topic, difficulty) {
            return Err(AdmissionError::Validation(message).into());
        }
        let (word, topic) = (word.unwrap_or_default(), topic.unwrap_or_default());

        let key = cache_key(word, topic, language);
        if let Some(hints) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(HintOutcome {
                hints,
                cached: true,
                fallback: false,
            });
        }

        let generated = self
            .hints
            .generate_hints(word, topic, difficulty, language)
            .await;
        let fallback = generated.is_fallback();
        if !fallback {
            self.cache.insert(&key, generated.hints.clone());
        }

        Ok(HintOutcome {
            hints: generated.hints,
            cached: false,
            fallback,
        })
    }

    async fn authenticate_bearer(
        &self,
        credentials: &RequestCredentials,
    ) -> Result<String, PipelineError> {
        let token = extract_bearer_token(credentials.authorization.as_deref())?;

        let verifier = self.identity.as_ref().ok_or_else(|| {
            error!("No identity verifier configured for bearer mode");
            PipelineError::Internal("identity verifier unavailable".to_string())
        })?;

        match verifier.verify(token).await {
            Ok(identity) => Ok(identity.uid),
            Err(IdentityError::Rejected(reason)) => {
                info!("Rejected {}: invalid token", credentials.client_addr);
                Err(AdmissionError::InvalidToken(reason).into())
            }
            Err(e @ IdentityError::Configuration(_)) => {
                error!("Identity verification failed: {}", e);
                Err(PipelineError::Internal(e.to_string()))
            }
        }
    }

    /// Drop idle rate-limit windows and expired cache entries
    pub async fn sweep(&self) {
        self.rate_limiter.cleanup_idle().await;
        self.cache.cleanup_expired();
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Whether the HTTP layer may take the client address from proxy headers
    pub fn trust_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &HintCache {
        &self.cache
    }

    pub fn quota(&self) -> &DeviceQuotaTracker {
        &self.quota
    }

    pub fn rate_limiter(&self) -> &IdentityRateLimiter {
        &self.rate_limiter
    }
}

fn parse_body(body: &[u8]) -> Result<HintRequest, AdmissionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(HintRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AdmissionError::Validation(format!("Invalid request body: {}", e)))
}
