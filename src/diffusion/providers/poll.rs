// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-interval status polling for poll-mode providers

use serde_json::Value;
use std::future::Future;
use tracing::debug;

use super::ProviderError;
use crate::config::PollConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    Pending,
    Succeeded(Value),
    /// Upstream reported a terminal failure; carries status and detail
    Failed { status: String, detail: String },
}

/// Check status every `config.interval` up to `config.max_attempts` times.
///
/// The first check happens one interval after submission.
pub async fn poll_until<F, Fut>(
    provider: &str,
    config: &PollConfig,
    mut check: F,
) -> Result<Value, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStatus, ProviderError>>,
{
    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(config.interval).await;

        match check(attempt).await? {
            PollStatus::Succeeded(body) => return Ok(body),
            PollStatus::Failed { status, detail } => {
                return Err(ProviderError::ExplicitFailure {
                    provider: provider.to_string(),
                    status,
                    detail,
                })
            }
            PollStatus::Pending => {
                debug!(
                    "{}: still pending after poll {}/{}",
                    provider, attempt, config.max_attempts
                );
            }
        }
    }

    Err(ProviderError::PollExhausted {
        provider: provider.to_string(),
        attempts: config.max_attempts,
    })
}
