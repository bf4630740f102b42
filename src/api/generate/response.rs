// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation response types

use serde::{Deserialize, Serialize};

use crate::diffusion::GenerationResult;

/// Response from image generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Sketch description used in the prompt (empty without a sketch)
    pub description: String,
    /// Final prompt sent to the provider
    pub prompt: String,
    /// URL or data URI of the generated image
    pub image: String,
    /// True when a provider other than the primary produced the image
    pub fallback: bool,
    /// Id of the fallback provider, present only when `fallback` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_type: Option<String>,
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            fallback_type: result.used_fallback.then_some(result.fallback_provider_id),
            description: result.description,
            prompt: result.prompt_text,
            image: result.result_url,
            fallback: result.used_fallback,
        }
    }
}
