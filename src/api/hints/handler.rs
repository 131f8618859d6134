// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint API endpoint handlers

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::request::credentials_from_headers;
use super::response::GenerateHintsResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /api/hints/generate - Generate four progressive hints
///
/// # Request
/// - `word`: Word to hint at (required, 2-50 chars)
/// - `topic`: One of the supported categories (required)
/// - `difficulty`: easy | medium | hard (default medium)
/// - `language`: `en` or `ta` (default en)
/// - `deviceId`: Enables the per-device daily quota when present
///
/// Signature mode also needs `X-App-Secret`, `X-Signature` and
/// `X-Timestamp`; bearer mode needs `Authorization: Bearer <token>`.
///
/// # Response
/// - `hints`: Array of four hints, hardest first
/// - `cached`: Whether hints came from the cache
/// - `fallback`: Present when the provider was bypassed
///
/// # Errors
/// - 400 Bad Request: Malformed body or invalid input
/// - 401 Unauthorized: Credential, signature or token failure
/// - 429 Too Many Requests: Rate or daily limit reached
/// - 500 Internal Server Error: Misconfigured identity verification
pub async fn generate_hints_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerateHintsResponse>, ApiError> {
    let credentials = credentials_from_headers(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        state.pipeline.trust_proxy_headers(),
    );
    let request_id = Uuid::new_v4();
    let span = info_span!("hint_request", %request_id, client = %credentials.client_addr);

    async move {
        debug!("Hint request received");

        let outcome = state.pipeline.handle(&credentials, &body).await?;

        info!(
            "Served hints (cached: {}, fallback: {})",
            outcome.cached, outcome.fallback
        );

        Ok::<_, ApiError>(Json(GenerateHintsResponse::from(outcome)))
    }
    .instrument(span)
    .await
}

/// OPTIONS /api/hints/generate - 200 with an empty body
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the hint endpoint
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}
