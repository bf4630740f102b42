// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::diffusion::{GenerationRequest, PriorExchange, Style};
use crate::vision::SketchImage;

/// Request for image generation via POST /api/generate
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Sketch as a data URI (optional when a personal prompt is given)
    #[serde(default)]
    pub image: Option<String>,

    /// Style label from the picker, e.g. "Watercolor"
    #[serde(default)]
    pub style: Option<String>,

    /// Last live-guess question shown to the artist
    #[serde(default)]
    pub question: Option<String>,

    /// The artist's answer to that question
    #[serde(default)]
    pub answer: Option<String>,

    /// Free-text instruction from the artist
    #[serde(default)]
    pub personal_prompt: Option<String>,
}

impl GenerateRequest {
    /// Validate the request and convert it for the orchestrator
    pub fn into_generation_request(self) -> Result<GenerationRequest, ApiError> {
        let sketch_image = match self.image.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let image = SketchImage::parse(raw)
                    .map_err(|e| ApiError::validation("image", e.to_string()))?;
                Some(image)
            }
            _ => None,
        };

        let personal_prompt = self
            .personal_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if sketch_image.is_none() && personal_prompt.is_none() {
            return Err(ApiError::validation(
                "image",
                "either image or personalPrompt is required",
            ));
        }

        let style = Style::parse_optional(self.style.as_deref())
            .map_err(|e| ApiError::validation("style", e.to_string()))?;

        Ok(GenerationRequest {
            sketch_image,
            style,
            prior: PriorExchange::from_parts(self.question.as_deref(), self.answer.as_deref()),
            personal_prompt,
        })
    }
}
