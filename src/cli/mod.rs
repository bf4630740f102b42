// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::{
    non_empty, ConfigError, DescriptionConfig, DiffusionConfig, FalConfig, PollConfig,
    ReplicateConfig, ServerConfig,
};

/// Sketchcast gateway
#[derive(Parser, Debug)]
#[command(name = "sketchcast")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(
    about = "Sketch description and image generation gateway with provider failover",
    long_about = None
)]
pub struct Args {
    /// Address the HTTP gateway binds to
    #[arg(long = "listen", env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen_addr: SocketAddr,

    /// Comma separated provider ids in priority order
    #[arg(
        long = "providers",
        env = "PROVIDER_ORDER",
        default_value = "replicate,fal,diffusion"
    )]
    pub provider_order: String,

    /// Per-attempt provider timeout
    #[arg(long, env = "ATTEMPT_TIMEOUT_SECS", default_value_t = 40)]
    pub attempt_timeout_secs: u64,

    /// Interval between status checks for poll-mode providers
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 2)]
    pub poll_interval_secs: u64,

    #[arg(long, env = "MAX_POLL_ATTEMPTS", default_value_t = 5)]
    pub max_poll_attempts: u32,

    /// Generations allowed in flight at once; extra requests get 503
    #[arg(long, env = "MAX_CONCURRENT_GENERATIONS", default_value_t = 8)]
    pub max_concurrent_generations: usize,

    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 15 * 1024 * 1024)]
    pub max_body_bytes: usize,

    #[arg(
        long,
        env = "DESCRIPTION_API_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    pub description_api_base: String,

    #[arg(long, env = "DESCRIPTION_MODEL", default_value = "gpt-4o-mini")]
    pub description_model: String,

    #[arg(long, env = "DESCRIPTION_TIMEOUT_SECS", default_value_t = 20)]
    pub description_timeout_secs: u64,

    #[arg(long, env = "DESCRIPTION_API_KEY", hide_env_values = true)]
    pub description_api_key: Option<String>,

    /// Used when DESCRIPTION_API_KEY is not set
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(
        long,
        env = "REPLICATE_API_BASE",
        default_value = "https://api.replicate.com/v1"
    )]
    pub replicate_api_base: String,

    #[arg(
        long,
        env = "REPLICATE_MODEL",
        default_value = "black-forest-labs/flux-kontext-pro"
    )]
    pub replicate_model: String,

    /// Text-to-image model for requests without a sketch
    #[arg(long, env = "REPLICATE_TEXT_MODEL")]
    pub replicate_text_model: Option<String>,

    #[arg(long, env = "REPLICATE_API_TOKEN", hide_env_values = true)]
    pub replicate_api_token: Option<String>,

    #[arg(long, env = "FAL_API_BASE", default_value = "https://fal.run")]
    pub fal_api_base: String,

    #[arg(
        long,
        env = "FAL_IMAGE_ENDPOINT",
        default_value = "fal-ai/flux/dev/image-to-image"
    )]
    pub fal_image_endpoint: String,

    #[arg(long, env = "FAL_TEXT_ENDPOINT", default_value = "fal-ai/flux/dev")]
    pub fal_text_endpoint: String,

    #[arg(long, env = "FAL_KEY", hide_env_values = true)]
    pub fal_key: Option<String>,

    #[arg(
        long,
        env = "DIFFUSION_ENDPOINT",
        default_value = "http://localhost:8082"
    )]
    pub diffusion_endpoint: String,

    #[arg(long, env = "DIFFUSION_MODEL", default_value = "flux2-klein-4b")]
    pub diffusion_model: String,

    #[arg(long, env = "DIFFUSION_API_KEY", hide_env_values = true)]
    pub diffusion_api_key: Option<String>,
}

impl Args {
    /// Build and validate the gateway configuration
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig {
            listen_addr: self.listen_addr,
            provider_order: ServerConfig::parse_provider_order(&self.provider_order),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            max_concurrent_generations: self.max_concurrent_generations,
            max_body_bytes: self.max_body_bytes,
            poll: PollConfig {
                interval: Duration::from_secs(self.poll_interval_secs),
                max_attempts: self.max_poll_attempts,
            },
            description: DescriptionConfig {
                api_base: self.description_api_base,
                model: self.description_model,
                api_key: non_empty(self.description_api_key).or(non_empty(self.openai_api_key)),
                timeout: Duration::from_secs(self.description_timeout_secs),
            },
            replicate: ReplicateConfig {
                api_base: self.replicate_api_base,
                model: self.replicate_model,
                text_model: non_empty(self.replicate_text_model),
                api_token: non_empty(self.replicate_api_token),
            },
            fal: FalConfig {
                api_base: self.fal_api_base,
                image_endpoint: self.fal_image_endpoint,
                text_endpoint: self.fal_text_endpoint,
                api_key: non_empty(self.fal_key),
                ..FalConfig::default()
            },
            diffusion: DiffusionConfig {
                endpoint: self.diffusion_endpoint,
                model: self.diffusion_model,
                api_key: non_empty(self.diffusion_api_key),
                ..DiffusionConfig::default()
            },
        };

        config.validate()?;
        Ok(config)
    }
}
