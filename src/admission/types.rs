// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types shared by the admission stages

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Key for rate-limit state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// User id verified by the identity provider
    User(String),
    /// Client network address
    Address(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::User(uid) => write!(f, "user:{}", uid),
            Identity::Address(ip) => write!(f, "ip:{}", ip),
        }
    }
}

/// Outcome of a daily quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    /// Time until the quota resets at local midnight (only when rejected)
    pub remaining_time: Option<Duration>,
}

impl QuotaDecision {
    pub fn admit() -> Self {
        Self {
            allowed: true,
            remaining_time: None,
        }
    }

    pub fn reject(remaining_time: Duration) -> Self {
        Self {
            allowed: false,
            remaining_time: Some(remaining_time),
        }
    }

    pub fn into_result(self) -> Result<(), AdmissionError> {
        match self.remaining_time {
            Some(remaining_time) if !self.allowed => {
                Err(AdmissionError::DailyLimitExceeded { remaining_time })
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of a sliding-window check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Whole seconds until the oldest counted request leaves the window
    pub retry_after_secs: Option<u64>,
}

impl RateDecision {
    pub fn admit() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    pub fn reject(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs),
        }
    }

    pub fn into_result(self) -> Result<(), AdmissionError> {
        match self.retry_after_secs {
            Some(retry_after_secs) if !self.allowed => {
                Err(AdmissionError::RateLimitExceeded { retry_after_secs })
            }
            _ => Ok(()),
        }
    }
}

/// Reasons a request is refused before reaching the cache
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Invalid app secret")]
    InvalidAppSecret,

    #[error("Missing request signature")]
    MissingSignature,

    #[error("Request expired")]
    ExpiredRequest,

    #[error("Invalid request signature")]
    InvalidSignature,

    #[error("Authorization header is required")]
    MissingAuthHeader,

    #[error("Authorization header must be: Bearer <token>")]
    InvalidAuthFormat,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Daily limit reached, resets in {}s", remaining_time.as_secs())]
    DailyLimitExceeded { remaining_time: Duration },

    #[error("Too many requests. Please wait {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("{0}")]
    Validation(String),
}

impl AdmissionError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::InvalidAppSecret => "INVALID_APP_SECRET",
            AdmissionError::MissingSignature => "MISSING_SIGNATURE",
            AdmissionError::ExpiredRequest => "EXPIRED_REQUEST",
            AdmissionError::InvalidSignature => "INVALID_SIGNATURE",
            AdmissionError::MissingAuthHeader => "MISSING_AUTH_HEADER",
            AdmissionError::InvalidAuthFormat => "INVALID_AUTH_FORMAT",
            AdmissionError::InvalidToken(_) => "INVALID_TOKEN",
            AdmissionError::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            AdmissionError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            AdmissionError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
