// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live guess endpoint handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{debug, warn};

use super::request::PredictRequest;
use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /api/predict - Guess what the sketch shows
///
/// Upstream problems never fail the request; they degrade to an empty or
/// generic guess.
pub async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Predict request body rejected: {}", e);
        ApiError::from_rejection(e)
    })?;

    let image = request.sketch_image().map_err(|e| {
        warn!("Predict validation failed: {}", e);
        e
    })?;

    debug!(
        "Predict request: {} bytes {}, previous_prediction={:?}",
        image.size_bytes(),
        image.mime_type(),
        request.previous_prediction()
    );

    let prediction = state
        .describer
        .predict(
            &image,
            request.previous_prediction(),
            request.user_response(),
        )
        .await;

    Ok(Json(prediction.into()))
}
