// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for hint generation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hints in every set
pub const HINT_COUNT: usize = 4;

/// Exactly four hints, hardest first
///
/// Position carries the tier: index 0 is the hard, indirect hint and index 3
/// the very easy, partial-reveal hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintSet([String; HINT_COUNT]);

impl HintSet {
    pub fn new(hints: [String; HINT_COUNT]) -> Self {
        Self(hints)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into()
    }
}

impl TryFrom<Vec<String>> for HintSet {
    type Error = Vec<String>;

    fn try_from(hints: Vec<String>) -> Result<Self, Self::Error> {
        <[String; HINT_COUNT]>::try_from(hints).map(Self)
    }
}

/// Where a hint set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintSource {
    /// Parsed from the provider's response
    Generated,
    /// Synthesized locally after a provider failure or unusable output
    Fallback,
}

/// Result of the orchestrator; never an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHints {
    pub hints: HintSet,
    pub source: HintSource,
}

impl GeneratedHints {
    pub fn is_fallback(&self) -> bool {
        self.source == HintSource::Fallback
    }
}

/// One chat-completion call to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Provider-side failures; absorbed by the orchestrator
#[derive(Debug, Error)]
pub enum HintError {
    #[error("Provider API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Provider timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Provider call budget exhausted")]
    Throttled,

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("No API key configured for {provider}")]
    NoApiKey { provider: String },
}
