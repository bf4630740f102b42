// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Replicate predictions API
//!
//! Submission asks the API to hold the connection (`Prefer: wait`). A
//! `succeeded` reply is used as is; `starting` or `processing` switches to
//! polling `urls.get` on a fixed interval.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::extract::{first_match, first_reference, Strategy};
use super::poll::{poll_until, PollStatus};
use super::{
    require_credential, response_json_or_error, Capabilities, ProviderAdapter, ProviderError,
};
use crate::config::{PollConfig, ReplicateConfig};
use crate::vision::SketchImage;

pub const PROVIDER_ID: &str = "replicate";
pub const CREDENTIAL_VAR: &str = "REPLICATE_API_TOKEN";

fn output(body: &Value) -> Option<String> {
    first_reference(&body["output"])
}

fn output_images(body: &Value) -> Option<String> {
    first_reference(&body["output"]["images"])
}

fn output_image(body: &Value) -> Option<String> {
    first_reference(&body["output"]["image"])
}

const STRATEGIES: &[Strategy] = &[
    Strategy::new("output", output),
    Strategy::new("output.images", output_images),
    Strategy::new("output.image", output_image),
];

pub struct ReplicateAdapter {
    client: Client,
    config: ReplicateConfig,
    poll: PollConfig,
}

impl ReplicateAdapter {
    pub fn new(config: ReplicateConfig, poll: PollConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        info!(
            "Replicate adapter configured: model={}, text_model={:?}",
            config.model, config.text_model
        );

        Ok(Self {
            client,
            config: ReplicateConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
            poll,
        })
    }

    fn model_for(&self, seed: Option<&SketchImage>) -> Result<&str, ProviderError> {
        match seed {
            Some(_) => Ok(&self.config.model),
            None => self.config.text_model.as_deref().ok_or_else(|| {
                ProviderError::Unsupported {
                    provider: PROVIDER_ID.to_string(),
                    reason: "no image supplied and no text model configured".to_string(),
                }
            }),
        }
    }

    /// `owner/name:version` pins a version; anything else runs the model's latest
    fn submission_body(model: &str, prompt: &str, seed: Option<&SketchImage>) -> Value {
        let mut input = json!({
            "prompt": prompt,
            "output_format": "png",
        });
        match seed {
            // Replicate accepts data URIs for file inputs
            Some(image) => input["input_image"] = json!(image.to_data_uri()),
            None => input["aspect_ratio"] = json!("1:1"),
        }

        match model.split_once(':') {
            Some((_, version)) => json!({ "version": version, "input": input }),
            None => json!({ "model": model, "input": input }),
        }
    }

    async fn fetch_prediction(&self, token: &str, url: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e))?;
        response_json_or_error(PROVIDER_ID, response).await
    }
}

/// Map a prediction's `status` field onto a poll status
pub fn prediction_status(prediction: &Value) -> PollStatus {
    let status = prediction["status"]
        .as_str()
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match status.as_str() {
        "succeeded" => PollStatus::Succeeded(prediction.clone()),
        "failed" | "canceled" | "cancelled" => PollStatus::Failed {
            detail: prediction["error"]
                .as_str()
                .unwrap_or("no error detail")
                .to_string(),
            status,
        },
        _ => PollStatus::Pending,
    }
}

#[async_trait]
impl ProviderAdapter for ReplicateAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            text_to_image: self.config.text_model.is_some(),
            image_to_image: true,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> Result<String, ProviderError> {
        let token = require_credential(PROVIDER_ID, CREDENTIAL_VAR, &self.config.api_token)?;
        let model = self.model_for(seed)?;

        let url = format!("{}/predictions", self.config.api_base);
        debug!("Replicate submit POST {} model={}", url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&Self::submission_body(model, prompt, seed))
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e))?;
        let prediction = response_json_or_error(PROVIDER_ID, response).await?;

        let finished = match prediction_status(&prediction) {
            PollStatus::Succeeded(body) => body,
            PollStatus::Failed { status, detail } => {
                return Err(ProviderError::ExplicitFailure {
                    provider: PROVIDER_ID.to_string(),
                    status,
                    detail,
                })
            }
            PollStatus::Pending => {
                let poll_url = prediction["urls"]["get"]
                    .as_str()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| {
                        ProviderError::malformed(PROVIDER_ID, "prediction missing urls.get")
                    })?;
                debug!("Replicate prediction pending, polling {}", poll_url);

                poll_until(PROVIDER_ID, &self.poll, |_| async move {
                    let body = self.fetch_prediction(token, poll_url).await?;
                    Ok(prediction_status(&body))
                })
                .await?
            }
        };

        first_match(PROVIDER_ID, STRATEGIES, &finished)
    }
}
