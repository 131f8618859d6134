// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for driving the router in-process

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use hint_gateway::{
    admission::{sign, HintPipeline, IdentityVerifier},
    api::{create_app, AppState},
    config::HintServiceConfig,
    hints::{CompletionRequest, HintError, HintGenerator},
    utils::{Clock, ManualClock},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const ENDPOINT: &str = "/api/hints/generate";

pub const PIZZA_HINTS: &str = "Here are your hints:\n\
1. Often shared at birthday parties\n\
2. Italian dish baked in an oven\n\
3. Starts with P, five letters long\n\
4. P _ Z Z A with melted cheese";

/// Generator with a canned reply that counts its calls
pub struct StubGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HintGenerator for StubGenerator {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, HintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(HintError::ApiError {
            status: 503,
            message: "provider unavailable".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Noon UTC on a fixed day; quota days are computed in UTC
pub fn test_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap())
}

pub fn test_config() -> HintServiceConfig {
    HintServiceConfig {
        app_secret: SECRET.to_string(),
        quota_utc_offset_minutes: Some(0),
        ..Default::default()
    }
}

pub fn build_app(
    config: &HintServiceConfig,
    generator: Option<Arc<dyn HintGenerator>>,
    identity: Option<Arc<dyn IdentityVerifier>>,
    clock: &ManualClock,
) -> Router {
    let pipeline = HintPipeline::new(config, generator, identity, Arc::new(clock.clone()));
    create_app(AppState::new(pipeline))
}

/// Signature-mode app backed by a generator that returns well-formed hints
pub fn pizza_app(clock: &ManualClock) -> (Router, Arc<StubGenerator>) {
    let generator = StubGenerator::replying(PIZZA_HINTS);
    let app = build_app(&test_config(), Some(generator.clone() as Arc<dyn HintGenerator>), None, clock);
    (app, generator)
}

/// POST with valid app secret and signature at the clock's current time
pub fn signed_request(clock: &ManualClock, body: Value, client_ip: &str) -> Request<Body> {
    signed_request_at(clock.now_millis(), body, client_ip)
}

pub fn signed_request_at(timestamp_ms: i64, body: Value, client_ip: &str) -> Request<Body> {
    let word = body["word"].as_str().unwrap_or_default();
    let topic = body["topic"].as_str().unwrap_or_default();
    let timestamp = timestamp_ms.to_string();
    let signature = sign(SECRET.as_bytes(), word, topic, &timestamp);

    let request = Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .header("content-type", "application/json")
        .header("X-App-Secret", SECRET)
        .header("X-Timestamp", timestamp)
        .header("X-Signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap();
    from_peer(request, client_ip)
}

/// Attach the connection peer the server would see from `serve`
pub fn from_peer(mut request: Request<Body>, client_ip: &str) -> Request<Body> {
    let ip: IpAddr = client_ip.parse().unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::new(ip, 40_000)));
    request
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}
