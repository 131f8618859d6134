// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::hints::{generate_hints_handler, method_not_allowed_handler, preflight_handler};
use crate::admission::HintPipeline;
use crate::config::AuthMode;
use crate::hints::CacheStats;

/// Interval between sweeps of idle rate-limit windows and expired cache entries
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<HintPipeline>,
}

impl AppState {
    pub fn new(pipeline: HintPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: serde_json::Value,
    pub auth_mode: AuthMode,
    pub cache: CacheStats,
}

/// Build the router without binding a socket
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/hints/generate",
            post(generate_hints_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, listen_addr: &str) -> anyhow::Result<()> {
    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let sweeper = tokio::spawn(sweep_loop(state.pipeline.clone()));
    let app = create_app(state);

    tracing::info!("Hint gateway listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tracing::info!("Hint gateway stopped");

    Ok(())
}

async fn sweep_loop(pipeline: Arc<HintPipeline>) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    // First tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        pipeline.sweep().await;
        tracing::debug!("Swept idle admission state");
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: crate::version::get_version_info(),
        auth_mode: state.pipeline.auth_mode(),
        cache: state.pipeline.cache_stats(),
    })
}
