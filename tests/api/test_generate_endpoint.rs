// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /api/generate

use axum::http::StatusCode;
use serde_json::json;
use sketchcast::api::GENERATION_FAILED_MESSAGE;
use std::sync::{Arc, Mutex};

use super::test_support::{app, post_json, BODY_LIMIT};
use crate::common::{png_data_uri, Behaviour, CallLog, FakeDescriber, FakeProvider};

fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn test_primary_success_shape() {
    let log = new_log();
    let primary = FakeProvider::new(
        "replicate",
        Behaviour::Succeed("https://cdn/r.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("a cat on a fence"), &[&primary], 4);

    let body = json!({"image": png_data_uri(), "style": "Watercolor"});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["description"], "a cat on a fence");
    assert_eq!(json["image"], "https://cdn/r.png");
    assert_eq!(json["fallback"], false);
    assert!(json.get("fallbackType").is_none());
    let prompt = json["prompt"].as_str().unwrap();
    assert!(prompt.contains("Watercolor style"));
}

#[tokio::test]
async fn test_fallback_reports_provider() {
    let log = new_log();
    let primary = FakeProvider::new("replicate", Behaviour::Fail("boom".to_string()), &log);
    let secondary = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("a dog"), &[&primary, &secondary], 4);

    let body = json!({
        "image": png_data_uri(),
        "personalPrompt": "add a red hat",
        "question": "Is it a dog?",
        "answer": "yes"
    });
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert_eq!(json["fallbackType"], "fal");
    assert_eq!(json["image"], "https://cdn/f.png");
}

#[tokio::test]
async fn test_prompt_only_request() {
    let log = new_log();
    let provider = FakeProvider::new(
        "diffusion",
        Behaviour::Succeed("https://cdn/d.png".to_string()),
        &log,
    );
    let describer = FakeDescriber::new("unused");
    let app = app(describer.clone(), &[&provider], 4);

    let body = json!({"personalPrompt": "a castle on a hill"});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["description"], "");
    let prompt = json["prompt"].as_str().unwrap();
    assert!(prompt.contains("a castle on a hill"));
    assert_eq!(describer.describe_calls(), 0);
    assert!(!provider.saw_seed());
}

#[tokio::test]
async fn test_neither_image_nor_prompt_is_400() {
    let log = new_log();
    let provider = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("unused"), &[&provider], 4);

    let body = json!({"style": "Anime", "personalPrompt": "  "});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_unknown_style_is_400() {
    let log = new_log();
    let provider = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("unused"), &[&provider], 4);

    let body = json!({"personalPrompt": "a castle", "style": "Cubism"});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "unknown style 'Cubism'");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_all_providers_failing_is_generic_500() {
    let log = new_log();
    let a = FakeProvider::new(
        "replicate",
        Behaviour::Fail("secret upstream detail".to_string()),
        &log,
    );
    let b = FakeProvider::new("fal", Behaviour::Panic, &log);
    let app = app(FakeDescriber::new("a boat"), &[&a, &b], 4);

    let body = json!({"image": png_data_uri()});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": GENERATION_FAILED_MESSAGE}));
}

#[tokio::test]
async fn test_no_free_permit_is_503() {
    let log = new_log();
    let provider = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("a boat"), &[&provider], 0);

    let body = json!({"image": png_data_uri()});
    let (status, json) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_invalid_request_is_400_even_without_free_permit() {
    let log = new_log();
    let provider = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );

    let bodies = [
        json!({}),
        json!({"personalPrompt": "a castle", "style": "Cubism"}),
        json!({"image": "data:text/plain;base64,aGVsbG8="}),
    ];
    for body in bodies {
        let app = app(FakeDescriber::new("a boat"), &[&provider], 0);
        let (status, json) = post_json(app, "/api/generate", body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(json["error"].is_string());
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let log = new_log();
    let provider = FakeProvider::new(
        "fal",
        Behaviour::Succeed("https://cdn/f.png".to_string()),
        &log,
    );
    let app = app(FakeDescriber::new("a boat"), &[&provider], 4);

    let body = json!({"personalPrompt": "x".repeat(BODY_LIMIT + 1)});
    let (status, _) = post_json(app, "/api/generate", body.to_string()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(provider.calls(), 0);
}
