// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Admission control for hint requests
//!
//! Each stage is its own service struct with explicitly owned state;
//! [`HintPipeline`] composes them in order and hands survivors to the hint
//! orchestrator.

pub mod credential;
pub mod identity;
pub mod pipeline;
pub mod quota;
pub mod rate_limiter;
pub mod signature;
pub mod types;
pub mod validation;

pub use credential::CredentialGate;
pub use identity::{IdentityError, IdentityVerifier, JwtIdentityVerifier, VerifiedIdentity};
pub use pipeline::{HintOutcome, HintPipeline, HintRequest, PipelineError, RequestCredentials};
pub use quota::DeviceQuotaTracker;
pub use rate_limiter::IdentityRateLimiter;
pub use signature::{sign, SignatureVerifier};
pub use types::{AdmissionError, Identity, QuotaDecision, RateDecision};
pub use validation::validate_input;
