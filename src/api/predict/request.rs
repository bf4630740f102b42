// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live guess request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::SketchImage;

/// Request for a live guess via POST /api/predict
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Sketch as a data URI (or bare base64)
    #[serde(default)]
    pub image: Option<String>,

    /// The guess shown to the artist last time
    #[serde(default)]
    pub previous_prediction: Option<String>,

    /// The artist's reply to that guess
    #[serde(default)]
    pub user_response: Option<String>,
}

impl PredictRequest {
    /// Validate and decode the sketch
    pub fn sketch_image(&self) -> Result<SketchImage, ApiError> {
        let raw = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation("image", "image is required"))?;

        SketchImage::parse(raw).map_err(|e| ApiError::validation("image", e.to_string()))
    }

    pub fn previous_prediction(&self) -> Option<&str> {
        non_blank(self.previous_prediction.as_deref())
    }

    pub fn user_response(&self) -> Option<&str> {
        non_blank(self.user_response.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
