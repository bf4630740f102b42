// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diffusion sidecar adapter against a local fake images API

use axum::{
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use sketchcast::config::DiffusionConfig;
use sketchcast::diffusion::providers::DiffusionAdapter;
use sketchcast::diffusion::{ProviderAdapter, ProviderError};
use std::sync::{Arc, Mutex};

use crate::common::{sketch, spawn_upstream, TINY_PNG_BASE64};

type Seen = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

fn adapter(endpoint: &str, api_key: Option<&str>) -> DiffusionAdapter {
    DiffusionAdapter::new(DiffusionConfig {
        endpoint: endpoint.to_string(),
        api_key: api_key.map(str::to_string),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_seeded_generation_returns_data_uri() {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let router = Router::new().route(
        "/v1/images/generations",
        post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
            recorder.lock().unwrap().push((headers, body));
            Json(json!({"created": 1, "data": [{"b64_json": "QUJD"}]}))
        }),
    );
    let base = spawn_upstream(router).await;

    let url = adapter(&base, Some("sk-local"))
        .generate("a lighthouse", Some(&sketch()))
        .await
        .unwrap();
    assert_eq!(url, "data:image/png;base64,QUJD");

    let seen = seen.lock().unwrap();
    let (headers, body) = &seen[0];
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-local");
    assert_eq!(body["image"], TINY_PNG_BASE64);
    assert_eq!(body["model"], "flux2-klein-4b");
    assert_eq!(body["num_inference_steps"], 4);
}

#[tokio::test]
async fn test_text_generation_with_url_result() {
    let router = Router::new().route(
        "/v1/images/generations",
        post(|Json(body): Json<Value>| async move {
            assert!(body.get("image").is_none());
            Json(json!({"data": [{"url": "http://sidecar/out/1.png"}]}))
        }),
    );
    let base = spawn_upstream(router).await;

    let url = adapter(&base, Some("sk-local"))
        .generate("a lighthouse", None)
        .await
        .unwrap();
    assert_eq!(url, "http://sidecar/out/1.png");
}

#[tokio::test]
async fn test_unreachable_sidecar_is_transport_error() {
    let err = adapter("http://127.0.0.1:9", Some("sk-local"))
        .generate("a lighthouse", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport { .. }));
}

#[tokio::test]
async fn test_missing_key_fails_fast() {
    let err = adapter("http://127.0.0.1:9", None)
        .generate("a lighthouse", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("DIFFUSION_API_KEY"));
}
