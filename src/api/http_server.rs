// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::generate::generate_handler;
use super::predict::predict_handler;
use crate::config::ServerConfig;
use crate::diffusion::{build_adapters, FailoverOrchestrator};
use crate::vision::{DescriptionClient, SketchDescriber};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FailoverOrchestrator>,
    pub describer: Arc<dyn SketchDescriber>,
    /// One permit per in-flight generation
    pub generation_permits: Arc<Semaphore>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<FailoverOrchestrator>,
        describer: Arc<dyn SketchDescriber>,
        max_concurrent_generations: usize,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            orchestrator,
            describer,
            generation_permits: Arc::new(Semaphore::new(max_concurrent_generations)),
            max_body_bytes,
        }
    }

    /// Wire the description client and provider adapters from configuration
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let describer: Arc<dyn SketchDescriber> =
            Arc::new(DescriptionClient::new(&config.description)?);
        let providers = build_adapters(config)?;
        let orchestrator = Arc::new(FailoverOrchestrator::new(
            Arc::clone(&describer),
            providers,
            config.attempt_timeout,
        ));

        Ok(Self::new(
            orchestrator,
            describer,
            config.max_concurrent_generations,
            config.max_body_bytes,
        ))
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/generate", post(generate_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = AppState::from_config(&config)?;
    tracing::info!(
        "Provider order: {:?}, attempt timeout {}s, max concurrent generations {}",
        state.orchestrator.provider_ids(),
        state.orchestrator.attempt_timeout().as_secs_f32(),
        config.max_concurrent_generations
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    tracing::info!("Sketch gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Sketch gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::version::VERSION_NUMBER,
        "features": crate::version::FEATURES,
        "providers": state.orchestrator.provider_ids(),
    }))
}
