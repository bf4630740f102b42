// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Start-up configuration for the gateway
//!
//! Everything here is read once when the process starts and then shared
//! read-only with the orchestrator and each provider adapter.

pub mod providers;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use providers::{DescriptionConfig, DiffusionConfig, FalConfig, PollConfig, ReplicateConfig};

/// Provider ids the gateway knows how to build adapters for
pub const KNOWN_PROVIDERS: &[&str] = &["replicate", "fal", "diffusion"];

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(40);
pub const DEFAULT_MAX_CONCURRENT_GENERATIONS: usize = 8;
/// Sketch data URIs arrive inline in JSON bodies
pub const DEFAULT_MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("provider order must name at least one provider")]
    EmptyProviderList,

    #[error("unknown provider '{0}'; known providers: replicate, fal, diffusion")]
    UnknownProvider(String),

    #[error("provider '{0}' is listed more than once")]
    DuplicateProvider(String),

    #[error("invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Providers in strict priority order
    pub provider_order: Vec<String>,
    pub attempt_timeout: Duration,
    pub max_concurrent_generations: usize,
    pub max_body_bytes: usize,
    pub poll: PollConfig,
    pub description: DescriptionConfig,
    pub replicate: ReplicateConfig,
    pub fal: FalConfig,
    pub diffusion: DiffusionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            provider_order: vec![
                "replicate".to_string(),
                "fal".to_string(),
                "diffusion".to_string(),
            ],
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_concurrent_generations: DEFAULT_MAX_CONCURRENT_GENERATIONS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            poll: PollConfig::default(),
            description: DescriptionConfig::default(),
            replicate: ReplicateConfig::default(),
            fal: FalConfig::default(),
            diffusion: DiffusionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration before any client is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_order.is_empty() {
            return Err(ConfigError::EmptyProviderList);
        }

        let mut seen = HashSet::new();
        for id in &self.provider_order {
            if !KNOWN_PROVIDERS.contains(&id.as_str()) {
                return Err(ConfigError::UnknownProvider(id.clone()));
            }
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateProvider(id.clone()));
            }
        }

        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroValue("attempt timeout"));
        }
        if self.max_concurrent_generations == 0 {
            return Err(ConfigError::ZeroValue("max concurrent generations"));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroValue("max body bytes"));
        }
        self.poll.validate()?;

        check_url("description api base", &self.description.api_base)?;
        if self.description.timeout.is_zero() {
            return Err(ConfigError::ZeroValue("description timeout"));
        }
        check_url("replicate api base", &self.replicate.api_base)?;
        check_url("fal api base", &self.fal.api_base)?;
        check_url("diffusion endpoint", &self.diffusion.endpoint)?;

        Ok(())
    }

    /// Parse a comma separated provider list, ignoring blanks
    pub fn parse_provider_order(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|id| id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

/// Treat unset and blank secrets the same way
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
