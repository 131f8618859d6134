// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Bearer-token authentication mode

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use hint_gateway::{
    admission::{identity::IdTokenClaims, IdentityVerifier, JwtIdentityVerifier},
    config::AuthMode,
    hints::HintGenerator,
    utils::ManualClock,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::support::*;

const PROJECT: &str = "action-reaction-game";
const JWT_SECRET: &[u8] = b"bearer-mode-test-secret";

fn id_token(uid: &str, expires_in_secs: i64) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
    let claims = IdTokenClaims {
        sub: uid.to_string(),
        aud: PROJECT.to_string(),
        iss: JwtIdentityVerifier::issuer_for(PROJECT),
        exp: (now + expires_in_secs) as u64,
        iat: Some(now as u64),
        auth_time: Some(now as u64),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET)).unwrap()
}

fn bearer_app(clock: &ManualClock) -> (Router, Arc<StubGenerator>) {
    let mut config = test_config();
    config.auth_mode = AuthMode::Bearer;
    config.identity.jwt_secret = Some(String::from_utf8_lossy(JWT_SECRET).into_owned());

    let verifier = JwtIdentityVerifier::with_hmac_secret(JWT_SECRET, PROJECT);
    let generator = StubGenerator::replying(PIZZA_HINTS);
    let app = build_app(
        &config,
        Some(generator.clone() as Arc<dyn HintGenerator>),
        Some(Arc::new(verifier) as Arc<dyn IdentityVerifier>),
        clock,
    );
    (app, generator)
}

fn bearer_request(authorization: Option<&str>, client_ip: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    let request = builder
        .body(Body::from(json!({"word": "Pizza", "topic": "food"}).to_string()))
        .unwrap();
    from_peer(request, client_ip)
}

#[tokio::test]
async fn test_valid_token_generates_hints() {
    let clock = test_clock();
    let (app, generator) = bearer_app(&clock);
    let token = id_token("user-123", 3600);

    let (status, json) = send(
        &app,
        bearer_request(Some(&format!("Bearer {}", token)), "203.0.113.1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hints"].as_array().unwrap().len(), 4);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_bearer_failures() {
    let clock = test_clock();
    let (app, generator) = bearer_app(&clock);

    let (status, json) = send(&app, bearer_request(None, "203.0.113.1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "MISSING_AUTH_HEADER");

    let token = id_token("user-123", 3600);
    let (status, json) = send(
        &app,
        bearer_request(Some(&format!("Token {}", token)), "203.0.113.1"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_AUTH_FORMAT");

    let expired = id_token("user-123", -3600);
    let (status, json) = send(
        &app,
        bearer_request(Some(&format!("Bearer {}", expired)), "203.0.113.1"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_TOKEN");

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_follows_user_not_address() {
    let clock = test_clock();
    let (app, _) = bearer_app(&clock);
    let authorization = format!("Bearer {}", id_token("user-42", 3600));

    // Same user from twenty different addresses
    for i in 0..20 {
        let (status, _) = send(
            &app,
            bearer_request(Some(&authorization), &format!("10.0.0.{}", i)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(&app, bearer_request(Some(&authorization), "10.0.1.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");

    let other = format!("Bearer {}", id_token("user-43", 3600));
    let (status, _) = send(&app, bearer_request(Some(&other), "10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);
}
