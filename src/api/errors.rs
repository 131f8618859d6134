// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::admission::{AdmissionError, PipelineError};

/// JSON body for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    /// Whole seconds (rate limit only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Milliseconds until local midnight (daily quota only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    ValidationError(String),
    Unauthorized {
        code: &'static str,
        message: String,
    },
    RateLimitExceeded {
        retry_after: u64,
    },
    DailyLimitExceeded {
        remaining_time_ms: u64,
    },
    MethodNotAllowed,
    InternalError(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized { code, .. } => *code,
            ApiError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (retry_after, remaining_time) = match self {
            ApiError::RateLimitExceeded { retry_after } => (Some(*retry_after), None),
            ApiError::DailyLimitExceeded { remaining_time_ms } => (None, Some(*remaining_time_ms)),
            _ => (None, None),
        };

        ErrorResponse {
            success: false,
            error: self.message(),
            code: self.code().to_string(),
            retry_after,
            remaining_time,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::ValidationError(msg) => msg.clone(),
            ApiError::Unauthorized { message, .. } => message.clone(),
            ApiError::RateLimitExceeded { .. } => {
                "Too many requests. Please wait a moment.".to_string()
            }
            ApiError::DailyLimitExceeded { .. } => {
                "Daily hint limit reached. Try again tomorrow.".to_string()
            }
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
            // Internal details stay in the logs
            ApiError::InternalError(_) => "Failed to generate hints".to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::MethodNotAllowed => 405,
            ApiError::RateLimitExceeded { .. } | ApiError::DailyLimitExceeded { .. } => 429,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized { code, message } => {
                write!(f, "Unauthorized ({}): {}", code, message)
            }
            ApiError::RateLimitExceeded { retry_after } => write!(
                f,
                "Rate limit exceeded, retry after {} seconds",
                retry_after
            ),
            ApiError::DailyLimitExceeded { remaining_time_ms } => write!(
                f,
                "Daily limit exceeded, resets in {} ms",
                remaining_time_ms
            ),
            ApiError::MethodNotAllowed => write!(f, "Method not allowed"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AdmissionError> for ApiError {
    fn from(e: AdmissionError) -> Self {
        match e {
            AdmissionError::Validation(message) => ApiError::ValidationError(message),
            AdmissionError::RateLimitExceeded { retry_after_secs } => ApiError::RateLimitExceeded {
                retry_after: retry_after_secs,
            },
            AdmissionError::DailyLimitExceeded { remaining_time } => {
                ApiError::DailyLimitExceeded {
                    remaining_time_ms: u64::try_from(remaining_time.as_millis())
                        .unwrap_or(u64::MAX),
                }
            }
            // Token details are not echoed to the caller
            AdmissionError::InvalidToken(_) => ApiError::Unauthorized {
                code: "INVALID_TOKEN",
                message: "Invalid or expired token".to_string(),
            },
            other => ApiError::Unauthorized {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Rejected(rejection) => rejection.into(),
            PipelineError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(msg) = &self {
            error!("Request failed: {}", msg);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
