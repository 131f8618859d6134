// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint API response types

use serde::{Deserialize, Serialize};

use crate::admission::HintOutcome;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Response body for POST /api/hints/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHintsResponse {
    pub success: bool,

    /// Four hints, hardest first
    pub hints: Vec<String>,

    /// Whether the hints were served from cache
    pub cached: bool,

    /// Present (and true) only when the provider was bypassed
    #[serde(default, skip_serializing_if = "is_false")]
    pub fallback: bool,
}

impl From<HintOutcome> for GenerateHintsResponse {
    fn from(outcome: HintOutcome) -> Self {
        Self {
            success: true,
            hints: outcome.hints.into_vec(),
            cached: outcome.cached,
            fallback: outcome.fallback,
        }
    }
}
