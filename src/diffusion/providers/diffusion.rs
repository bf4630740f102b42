// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diffusion sidecar adapter via OpenAI-compatible images API

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::extract::{first_match, first_reference, Strategy};
use super::{
    require_credential, response_json_or_error, Capabilities, ProviderAdapter, ProviderError,
};
use crate::config::DiffusionConfig;
use crate::vision::SketchImage;

pub const PROVIDER_ID: &str = "diffusion";
pub const CREDENTIAL_VAR: &str = "DIFFUSION_API_KEY";

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: String,
    pub size: String,
    pub n: u32,
    pub response_format: String,
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
    /// Raw base64, no data-URI prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
}

fn data_url(body: &Value) -> Option<String> {
    first_reference(&body["data"][0]["url"])
}

/// Inline base64 results are turned into a displayable data URI
fn data_b64_json(body: &Value) -> Option<String> {
    body["data"][0]["b64_json"]
        .as_str()
        .map(str::trim)
        .filter(|b64| !b64.is_empty())
        .map(|b64| format!("data:image/png;base64,{}", b64))
}

fn output(body: &Value) -> Option<String> {
    first_reference(&body["output"])
}

const STRATEGIES: &[Strategy] = &[
    Strategy::new("data[0].url", data_url),
    Strategy::new("data[0].b64_json", data_b64_json),
    Strategy::new("output", output),
];

/// Adapter for a self-hosted diffusion sidecar
pub struct DiffusionAdapter {
    client: Client,
    endpoint: String,
    config: DiffusionConfig,
}

impl DiffusionAdapter {
    pub fn new(config: DiffusionConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        info!(
            "Diffusion adapter configured: endpoint={}, model={}",
            endpoint, config.model
        );

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    /// A seed switches the sidecar to image-to-image
    pub fn build_request(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> ImageGenerationRequest {
        ImageGenerationRequest {
            prompt: prompt.to_string(),
            model: self.config.model.clone(),
            size: self.config.size.clone(),
            n: 1,
            response_format: "b64_json".to_string(),
            guidance_scale: self.config.guidance_scale,
            num_inference_steps: self.config.steps,
            image: seed.map(|image| image.base64_payload().to_string()),
            strength: seed.map(|_| self.config.strength),
        }
    }
}

#[async_trait]
impl ProviderAdapter for DiffusionAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            text_to_image: true,
            image_to_image: true,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> Result<String, ProviderError> {
        let key = require_credential(PROVIDER_ID, CREDENTIAL_VAR, &self.config.api_key)?;

        let url = format!("{}/v1/images/generations", self.endpoint);
        debug!(
            "Diffusion generate POST {} (image_to_image={})",
            url,
            seed.is_some()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&self.build_request(prompt, seed))
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e))?;
        let body = response_json_or_error(PROVIDER_ID, response).await?;

        first_match(PROVIDER_ID, STRATEGIES, &body)
    }
}
