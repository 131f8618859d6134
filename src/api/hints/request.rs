// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint API request extraction

use axum::http::HeaderMap;
use std::net::SocketAddr;

use crate::admission::RequestCredentials;

pub const APP_SECRET_HEADER: &str = "x-app-secret";
pub const SIGNATURE_HEADER: &str = "x-signature";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

fn forwarded_addr(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-forwarded-for")
        .and_then(|v| {
            v.split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string)
        })
        .or_else(|| header(headers, "x-real-ip").filter(|ip| !ip.is_empty()))
}

/// Client address used as the rate-limit identity in signature mode
///
/// The peer address of the connection, unless `trust_proxy` is set; then the
/// first `X-Forwarded-For` hop or `X-Real-IP` wins when present.
pub fn client_addr(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    trust_proxy
        .then(|| forwarded_addr(headers))
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Collect the authentication headers and caller address
pub fn credentials_from_headers(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> RequestCredentials {
    RequestCredentials {
        app_secret: header(headers, APP_SECRET_HEADER),
        signature: header(headers, SIGNATURE_HEADER),
        timestamp: header(headers, TIMESTAMP_HEADER),
        authorization: headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        client_addr: client_addr(headers, peer, trust_proxy),
    }
}
