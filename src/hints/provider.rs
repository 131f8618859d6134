// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint generator trait definition

use async_trait::async_trait;

use super::types::{CompletionRequest, HintError};

/// An LLM backend that turns a prompt into free text
///
/// The orchestrator treats the returned text as untrusted: it is parsed for
/// numbered hints and replaced with fallback hints when unusable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HintGenerator: Send + Sync {
    /// Run one chat completion
    async fn complete(&self, request: CompletionRequest) -> Result<String, HintError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
