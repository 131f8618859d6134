// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the hint gateway

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-hint-gateway-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "app-secret-gate",
    "hmac-signatures",
    "replay-window",
    "bearer-auth",
    "device-daily-quota",
    "sliding-window-rate-limit",
    "hint-cache",
    "fallback-hints",
    "tamil-hints",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Hint Gateway {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
