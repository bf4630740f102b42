// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation backends behind one adapter interface

pub mod diffusion;
pub mod extract;
pub mod fal;
pub mod poll;
pub mod replicate;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::vision::SketchImage;

pub use diffusion::DiffusionAdapter;
pub use fal::FalAdapter;
pub use replicate::ReplicateAdapter;

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub text_to_image: bool,
    pub image_to_image: bool,
}

impl Capabilities {
    /// Whether a call with or without a seed image can be served
    pub fn supports(&self, has_seed: bool) -> bool {
        if has_seed {
            self.image_to_image
        } else {
            self.text_to_image
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: missing credential, {variable} is not set")]
    MissingCredential {
        provider: String,
        variable: &'static str,
    },

    #[error("{provider}: unsupported: {reason}")]
    Unsupported { provider: String, reason: String },

    #[error("{provider}: upstream returned {status}: {body}")]
    Rejected {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider}: transport error: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider}: generation {status}: {detail}")]
    ExplicitFailure {
        provider: String,
        status: String,
        detail: String,
    },

    #[error("{provider}: no definitive status after {attempts} polls")]
    PollExhausted { provider: String, attempts: u32 },

    #[error("{provider}: result not found in response")]
    ResultNotFound { provider: String },

    #[error("{provider}: malformed response: {message}")]
    Malformed { provider: String, message: String },

    #[error("provider task panicked: {0}")]
    Panicked(String),
}

impl ProviderError {
    pub fn transport(provider: &str, err: reqwest::Error) -> Self {
        ProviderError::Transport {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// Uniform interface over heterogeneous image generation backends.
///
/// `generate` covers submission, waiting (inline or by polling) and result
/// extraction. The returned string is an `http(s)` URL or a `data:image/` URI.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    async fn generate(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> Result<String, ProviderError>;
}

/// Build adapters for every configured provider, in priority order
pub fn build_adapters(config: &ServerConfig) -> anyhow::Result<Vec<Arc<dyn ProviderAdapter>>> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> =
        Vec::with_capacity(config.provider_order.len());
    for id in &config.provider_order {
        let adapter: Arc<dyn ProviderAdapter> = match id.as_str() {
            replicate::PROVIDER_ID => {
                Arc::new(ReplicateAdapter::new(config.replicate.clone(), config.poll)?)
            }
            fal::PROVIDER_ID => Arc::new(FalAdapter::new(config.fal.clone())?),
            diffusion::PROVIDER_ID => Arc::new(DiffusionAdapter::new(config.diffusion.clone())?),
            other => anyhow::bail!("unknown provider '{}'", other),
        };
        adapters.push(adapter);
    }
    Ok(adapters)
}

/// Fail fast when a credential is absent, before any network call
pub(crate) fn require_credential<'a>(
    provider: &str,
    variable: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ProviderError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ProviderError::MissingCredential {
            provider: provider.to_string(),
            variable,
        })
}

/// Read a JSON body, turning non-2xx statuses into `Rejected`
pub(crate) async fn response_json_or_error(
    provider: &str,
    response: reqwest::Response,
) -> Result<serde_json::Value, ProviderError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    if !status.is_success() {
        return Err(ProviderError::Rejected {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: truncate_text(&text, MAX_ERROR_BODY_CHARS),
        });
    }

    serde_json::from_str(&text).map_err(|e| ProviderError::malformed(provider, e.to_string()))
}

pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
