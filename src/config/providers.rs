// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-upstream settings: description model and image providers

use std::time::Duration;

use super::ConfigError;

/// Fixed-interval polling for poll-mode providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 5,
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroValue("poll interval"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroValue("max poll attempts"));
        }
        Ok(())
    }
}

/// Vision model used for sketch description and live guessing
#[derive(Debug, Clone)]
pub struct DescriptionConfig {
    /// OpenAI-compatible base URL, e.g. `https://api.openai.com/v1`
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_base: String,
    /// Image-conditioned model, `owner/name` or `owner/name:version`
    pub model: String,
    /// Optional text-to-image model used when no sketch is supplied
    pub text_model: Option<String>,
    pub api_token: Option<String>,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.replicate.com/v1".to_string(),
            model: "black-forest-labs/flux-kontext-pro".to_string(),
            text_model: None,
            api_token: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FalConfig {
    pub api_base: String,
    pub image_endpoint: String,
    pub text_endpoint: String,
    pub api_key: Option<String>,
    pub strength: f32,
}

impl Default for FalConfig {
    fn default() -> Self {
        Self {
            api_base: "https://fal.run".to_string(),
            image_endpoint: "fal-ai/flux/dev/image-to-image".to_string(),
            text_endpoint: "fal-ai/flux/dev".to_string(),
            api_key: None,
            strength: 0.85,
        }
    }
}

/// OpenAI-compatible images API (self-hosted diffusion sidecar)
#[derive(Debug, Clone)]
pub struct DiffusionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub size: String,
    pub steps: u32,
    pub guidance_scale: f32,
    pub strength: f32,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8082".to_string(),
            model: "flux2-klein-4b".to_string(),
            api_key: None,
            size: "1024x1024".to_string(),
            steps: 4,
            guidance_scale: 3.5,
            strength: 0.75,
        }
    }
}
