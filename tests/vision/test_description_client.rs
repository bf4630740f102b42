// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DescriptionClient against a local fake chat completions API

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use sketchcast::config::DescriptionConfig;
use sketchcast::diffusion::PriorExchange;
use sketchcast::vision::{
    DescriptionClient, Prediction, SketchDescriber, GENERIC_DESCRIPTION, GENERIC_GUESS,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::{png_data_uri, sketch, spawn_upstream};

type Seen = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

fn chat_reply(content: &str) -> Value {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
}

/// Upstream that records requests and answers every call with `reply`
async fn upstream(status: StatusCode, reply: String) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
            recorder.lock().unwrap().push((headers, body));
            (status, reply).into_response()
        }),
    );
    let base = spawn_upstream(router).await;
    (format!("{}/v1", base), seen)
}

pub fn client(api_base: &str, api_key: Option<&str>) -> DescriptionClient {
    DescriptionClient::new(&DescriptionConfig {
        api_base: api_base.to_string(),
        api_key: api_key.map(str::to_string),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

// ===== describe =====

#[tokio::test]
async fn test_describe_sends_image_and_cleans_reply() {
    let (base, seen) = upstream(
        StatusCode::OK,
        chat_reply("  A cat\n sitting on a fence. ").to_string(),
    )
    .await;

    let description = client(&base, Some("sk-test")).describe(&sketch(), None).await;
    assert_eq!(description, "A cat sitting on a fence.");

    let seen = seen.lock().unwrap();
    let (headers, body) = &seen[0];
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
    assert_eq!(body["model"], "gpt-4o-mini");
    let content = &body["messages"][0]["content"];
    assert_eq!(content[1]["image_url"]["url"], png_data_uri());
}

#[tokio::test]
async fn test_describe_includes_prior_exchange() {
    let (base, seen) = upstream(StatusCode::OK, chat_reply("A fox").to_string()).await;
    let prior = PriorExchange {
        question: "Is it a cat?".to_string(),
        answer: "no, a fox".to_string(),
    };

    client(&base, Some("sk-test")).describe(&sketch(), Some(&prior)).await;

    let seen = seen.lock().unwrap();
    let prompt = seen[0].1["messages"][0]["content"][0]["text"].as_str().unwrap().to_string();
    assert!(prompt.contains("Is it a cat?"));
    assert!(prompt.contains("no, a fox"));
}

#[tokio::test]
async fn test_describe_unusable_reply_is_generic() {
    let (base, _) = upstream(StatusCode::OK, "this is not json".to_string()).await;
    let description = client(&base, Some("sk-test")).describe(&sketch(), None).await;
    assert_eq!(description, GENERIC_DESCRIPTION);

    let (base, _) = upstream(StatusCode::OK, json!({"choices": []}).to_string()).await;
    let description = client(&base, Some("sk-test")).describe(&sketch(), None).await;
    assert_eq!(description, GENERIC_DESCRIPTION);
}

#[tokio::test]
async fn test_describe_upstream_error_is_empty() {
    let (base, _) = upstream(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()).await;
    let description = client(&base, Some("sk-test")).describe(&sketch(), None).await;
    assert_eq!(description, "");
}

#[tokio::test]
async fn test_describe_without_key_makes_no_call() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(chat_reply("A cat"))
        }),
    );
    let base = spawn_upstream(router).await;

    let description = client(&format!("{}/v1", base), None).describe(&sketch(), None).await;

    assert_eq!(description, "");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ===== predict =====

#[tokio::test]
async fn test_predict_parses_json_guess() {
    let (base, _) = upstream(
        StatusCode::OK,
        chat_reply(r#"{"guess": "a rocket", "ethics": 1}"#).to_string(),
    )
    .await;

    let prediction = client(&base, Some("sk-test")).predict(&sketch(), None, None).await;
    assert_eq!(
        prediction,
        Prediction {
            guess: "a rocket".to_string(),
            acceptable: Some(true),
        }
    );
}

#[tokio::test]
async fn test_predict_avoids_previous_guess() {
    let (base, seen) = upstream(
        StatusCode::OK,
        chat_reply(r#"{"guess": "A Rocket", "ethics": 1}"#).to_string(),
    )
    .await;

    let prediction = client(&base, Some("sk-test"))
        .predict(&sketch(), Some("a rocket"), Some("no, it's a pencil"))
        .await;
    assert_eq!(prediction.guess, GENERIC_GUESS);

    let seen = seen.lock().unwrap();
    let prompt = seen[0].1["messages"][0]["content"][0]["text"].as_str().unwrap().to_string();
    assert!(prompt.contains("no, it's a pencil"));
}

#[tokio::test]
async fn test_predict_keyword_sniffing() {
    let (base, _) = upstream(
        StatusCode::OK,
        chat_reply("guess: 'a small boat', ethics: 0").to_string(),
    )
    .await;

    let prediction = client(&base, Some("sk-test")).predict(&sketch(), None, None).await;
    assert_eq!(prediction.guess, "a small boat");
    assert_eq!(prediction.ethics_flag(), Some(0));
}

#[tokio::test]
async fn test_predict_upstream_error_is_unavailable() {
    let (base, _) = upstream(StatusCode::BAD_GATEWAY, "down".to_string()).await;
    let prediction = client(&base, Some("sk-test")).predict(&sketch(), None, None).await;
    assert_eq!(prediction, Prediction::unavailable());
}

#[tokio::test]
async fn test_predict_empty_reply_is_fallback() {
    let reply = json!({"choices": [{"message": {"content": null}}]});
    let (base, _) = upstream(StatusCode::OK, reply.to_string()).await;
    let prediction = client(&base, Some("sk-test")).predict(&sketch(), None, None).await;
    assert_eq!(prediction, Prediction::fallback());
}
