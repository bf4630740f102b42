// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{debug, warn};

use super::request::GenerateRequest;
use super::response::GenerateResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /api/generate - Generate an image from a sketch and/or prompt
///
/// Pipeline:
/// 1. Validate request (400 on missing input, bad image or unknown style)
/// 2. Take a generation permit (503 if all are in use)
/// 3. Run the failover orchestrator
/// 4. Map total failure to a single generic 500
pub async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Generate request body rejected: {}", e);
        ApiError::from_rejection(e)
    })?;

    let request = request.into_generation_request().map_err(|e| {
        warn!("Image generation validation failed: {}", e);
        e
    })?;

    debug!(
        "Image generation request: has_image={}, style={:?}, has_prior={}, has_prompt={}",
        request.sketch_image.is_some(),
        request.style,
        request.prior.is_some(),
        request.personal_prompt.is_some()
    );

    let permits = state.generation_permits.clone();
    let _permit = permits.try_acquire_owned().map_err(|_| {
        warn!("Generation rejected: concurrency limit reached");
        ApiError::ServiceUnavailable(
            "Too many generations in progress, try again shortly".to_string(),
        )
    })?;

    let result = state.orchestrator.generate(request).await?;
    Ok(Json(result.into()))
}
