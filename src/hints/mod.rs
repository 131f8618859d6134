// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint generation
//!
//! Turns a validated (word, topic) pair into four progressive hints:
//! - Prompting an OpenAI-compatible provider (Groq) under a timeout
//! - Parsing numbered hints out of free text
//! - Deterministic fallback hints when the provider is unusable
//! - TTL + FIFO response cache for generated hints

pub mod cache;
pub mod fallback;
pub mod groq;
pub mod prompt;
pub mod provider;
pub mod service;
pub mod throttle;
pub mod types;

pub use cache::{cache_key, CacheStats, HintCache};
pub use groq::GroqClient;
pub use provider::HintGenerator;
pub use service::HintService;
pub use types::{CompletionRequest, GeneratedHints, HintError, HintSet, HintSource};
