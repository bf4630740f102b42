// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! fal.run synchronous endpoints

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::extract::{first_match, first_reference, Strategy};
use super::{
    require_credential, response_json_or_error, Capabilities, ProviderAdapter, ProviderError,
};
use crate::config::FalConfig;
use crate::vision::SketchImage;

pub const PROVIDER_ID: &str = "fal";
pub const CREDENTIAL_VAR: &str = "FAL_KEY";

fn images(body: &Value) -> Option<String> {
    first_reference(&body["images"])
}

fn image(body: &Value) -> Option<String> {
    first_reference(&body["image"])
}

fn output(body: &Value) -> Option<String> {
    first_reference(&body["output"])
}

fn url(body: &Value) -> Option<String> {
    first_reference(&body["url"])
}

const STRATEGIES: &[Strategy] = &[
    Strategy::new("images[].url", images),
    Strategy::new("image.url", image),
    Strategy::new("output", output),
    Strategy::new("url", url),
];

pub struct FalAdapter {
    client: Client,
    config: FalConfig,
}

impl FalAdapter {
    pub fn new(config: FalConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        info!(
            "fal adapter configured: image_endpoint={}, text_endpoint={}",
            config.image_endpoint, config.text_endpoint
        );

        Ok(Self {
            client,
            config: FalConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Seeded calls go to the image-to-image endpoint, the rest to text-to-image
    fn endpoint_for(&self, seed: Option<&SketchImage>) -> Result<String, ProviderError> {
        let path = match seed {
            Some(_) => &self.config.image_endpoint,
            None => &self.config.text_endpoint,
        };
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(ProviderError::Unsupported {
                provider: PROVIDER_ID.to_string(),
                reason: "no endpoint configured for this mode".to_string(),
            });
        }
        Ok(format!("{}/{}", self.config.api_base, path))
    }

    fn request_body(&self, prompt: &str, seed: Option<&SketchImage>) -> Value {
        let mut body = json!({
            "prompt": prompt,
            "num_images": 1,
        });
        if let Some(image) = seed {
            body["image_url"] = json!(image.to_data_uri());
            body["strength"] = json!(self.config.strength);
        }
        body
    }
}

#[async_trait]
impl ProviderAdapter for FalAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            text_to_image: !self.config.text_endpoint.trim_matches('/').is_empty(),
            image_to_image: !self.config.image_endpoint.trim_matches('/').is_empty(),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> Result<String, ProviderError> {
        let key = require_credential(PROVIDER_ID, CREDENTIAL_VAR, &self.config.api_key)?;
        let url = self.endpoint_for(seed)?;
        debug!("fal generate POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Key {}", key))
            .json(&self.request_body(prompt, seed))
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e))?;
        let body = response_json_or_error(PROVIDER_ID, response).await?;

        first_match(PROVIDER_ID, STRATEGIES, &body)
    }
}
