// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint orchestration
//!
//! Calls the provider under a timeout and a process-wide call budget, parses
//! the response, and falls back to locally synthesized hints whenever any of
//! that goes wrong. Callers always get four hints.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::fallback::generate_fallback_hints;
use super::prompt::{build_prompt, parse_hints, SYSTEM_PROMPT};
use super::provider::HintGenerator;
use super::throttle::ProviderThrottle;
use super::types::{CompletionRequest, GeneratedHints, HintError, HintSet, HintSource};
use crate::config::GeneratorConfig;

/// Orchestrates provider calls with fallback
pub struct HintService {
    generator: Option<Arc<dyn HintGenerator>>,
    throttle: ProviderThrottle,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl HintService {
    /// Create a new hint service
    ///
    /// With no generator every request is served from the fallback.
    pub fn new(generator: Option<Arc<dyn HintGenerator>>, config: &GeneratorConfig) -> Self {
        match &generator {
            Some(g) => debug!("Hint provider enabled: {}", g.name()),
            None => warn!("No hint provider configured, serving fallback hints only"),
        }

        Self {
            generator,
            throttle: ProviderThrottle::new(config.rate_limit_per_minute),
            timeout: Duration::from_millis(config.timeout_ms),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Produce four hints for a word; never fails
    pub async fn generate_hints(
        &self,
        word: &str,
        topic: &str,
        difficulty: &str,
        language: &str,
    ) -> GeneratedHints {
        let start = Instant::now();

        match self.try_generate(word, topic, difficulty, language).await {
            Ok(hints) => {
                info!(
                    "Generated hints for '{}' ({}) in {}ms",
                    word,
                    topic,
                    start.elapsed().as_millis()
                );
                GeneratedHints {
                    hints,
                    source: HintSource::Generated,
                }
            }
            Err(e) => {
                warn!("Hint generation failed for '{}': {}, using fallback", word, e);
                GeneratedHints {
                    hints: generate_fallback_hints(word, topic),
                    source: HintSource::Fallback,
                }
            }
        }
    }

    async fn try_generate(
        &self,
        word: &str,
        topic: &str,
        difficulty: &str,
        language: &str,
    ) -> Result<HintSet, HintError> {
        let generator = self.generator.as_ref().ok_or_else(|| HintError::NoApiKey {
            provider: "none".to_string(),
        })?;

        self.throttle.check()?;

        let request = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_prompt(word, topic, difficulty, language),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let content = tokio::time::timeout(self.timeout, generator.complete(request))
            .await
            .map_err(|_| HintError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        let parsed = parse_hints(&content);
        HintSet::try_from(parsed).map_err(|partial| {
            HintError::Malformed(format!("expected 4 numbered hints, found {}", partial.len()))
        })
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }
}
