// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end hint generation through the router

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use hint_gateway::hints::{fallback::generate_fallback_hints, HintGenerator};
use serde_json::json;
use std::sync::Arc;

use super::support::*;

#[tokio::test]
async fn test_pizza_generated_then_cached() {
    let clock = test_clock();
    let (app, generator) = pizza_app(&clock);
    let body = json!({"word": "Pizza", "topic": "food"});

    let (status, first) = send(&app, signed_request(&clock, body.clone(), "203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["cached"], false);
    assert!(first.get("fallback").is_none());

    let hints = first["hints"].as_array().unwrap();
    assert_eq!(hints.len(), 4);
    assert_eq!(hints[0], "Often shared at birthday parties");
    assert_eq!(hints[3], "P _ Z Z A with melted cheese");

    let (status, second) = send(&app, signed_request(&clock, body, "203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cached"], true);
    assert_eq!(second["hints"], first["hints"]);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_cache_key_ignores_word_case() {
    let clock = test_clock();
    let (app, generator) = pizza_app(&clock);

    send(
        &app,
        signed_request(&clock, json!({"word": "Pizza", "topic": "food"}), "203.0.113.1"),
    )
    .await;
    let (_, again) = send(
        &app,
        signed_request(&clock, json!({"word": "PIZZA", "topic": "food"}), "203.0.113.1"),
    )
    .await;

    assert_eq!(again["cached"], true);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_cache_expires_after_a_day() {
    let clock = test_clock();
    let (app, generator) = pizza_app(&clock);
    let body = json!({"word": "Pizza", "topic": "food"});

    send(&app, signed_request(&clock, body.clone(), "203.0.113.1")).await;
    clock.advance(chrono::Duration::hours(24));

    let (status, json) = send(&app, signed_request(&clock, body, "203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cached"], false);
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_provider_failure_serves_uncached_fallback() {
    let clock = test_clock();
    let generator = StubGenerator::failing();
    let app = build_app(
        &test_config(),
        Some(generator.clone() as Arc<dyn HintGenerator>),
        None,
        &clock,
    );
    let body = json!({"word": "Pizza", "topic": "food"});

    for _ in 0..2 {
        let (status, json) = send(&app, signed_request(&clock, body.clone(), "203.0.113.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["fallback"], true);
        assert_eq!(json["cached"], false);

        let expected = generate_fallback_hints("Pizza", "food").into_vec();
        assert_eq!(json["hints"], json!(expected));
    }
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_unparseable_reply_serves_fallback() {
    let clock = test_clock();
    let generator = StubGenerator::replying("I'd rather not number these.");
    let app = build_app(
        &test_config(),
        Some(generator as Arc<dyn HintGenerator>),
        None,
        &clock,
    );

    let (status, json) = send(
        &app,
        signed_request(&clock, json!({"word": "Pizza", "topic": "food"}), "203.0.113.1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert_eq!(json["hints"][3], "P _ _ _ A");
}

#[tokio::test]
async fn test_language_is_part_of_cache_key() {
    let clock = test_clock();
    let (app, generator) = pizza_app(&clock);

    for language in ["en", "ta"] {
        let (_, json) = send(
            &app,
            signed_request(
                &clock,
                json!({"word": "Pizza", "topic": "food", "language": language}),
                "203.0.113.1",
            ),
        )
        .await;
        assert_eq!(json["cached"], false);
    }
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_validation_errors() {
    let clock = test_clock();
    let (app, generator) = pizza_app(&clock);

    let cases = [
        (json!({"topic": "food"}), "Word is required"),
        (json!({"word": "P", "topic": "food"}), "Word must be between 2-50 characters"),
        (json!({"word": "Pizza", "topic": "cars"}), "Invalid topic"),
        (
            json!({"word": "Pizza", "topic": "food", "difficulty": "extreme"}),
            "Invalid difficulty",
        ),
    ];

    for (body, message) in cases {
        let (status, json) = send(&app, signed_request(&clock, body, "203.0.113.2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(
            json["error"].as_str().unwrap().starts_with(message),
            "unexpected message {}",
            json["error"]
        );
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let clock = test_clock();
    let (app, _) = pizza_app(&clock);

    let timestamp = hint_gateway::utils::Clock::now_millis(&clock).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .header("content-type", "application/json")
        .header("X-App-Secret", SECRET)
        .header("X-Timestamp", timestamp.clone())
        .header(
            "X-Signature",
            hint_gateway::admission::sign(SECRET.as_bytes(), "", "", &timestamp),
        )
        .body(Body::from("{\"word\": "))
        .unwrap();

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
