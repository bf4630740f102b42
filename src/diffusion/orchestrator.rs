// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Failover orchestration across image providers
//!
//! Pipeline per request:
//! 1. Validate (sketch or personal prompt required)
//! 2. Describe the sketch, if any, and compose the prompt
//! 3. Skip providers that cannot serve this request mode
//! 4. Try the rest strictly in configured order, each raced against the
//!    per-attempt timeout, until one succeeds
//!
//! Intermediate failures never reach the caller; only validation errors and
//! total exhaustion do.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::prompt_composer::{ComposedPrompt, PromptComposer};
use super::providers::{ProviderAdapter, ProviderError};
use super::request::{
    AttemptOutcome, GenerationRequest, GenerationResult, ProviderAttempt, SkippedProvider,
};
use crate::vision::{SketchDescriber, SketchImage};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation request: {0}")]
    Validation(String),

    #[error(
        "all providers failed ({} attempted, {} skipped)",
        .attempts.len(),
        .skipped.len()
    )]
    Exhausted {
        attempts: Vec<ProviderAttempt>,
        skipped: Vec<SkippedProvider>,
        /// One entry per configured provider, in priority order
        reasons: Vec<String>,
    },
}

/// Aborts the spawned provider call when dropped, whether the attempt timed
/// out or the caller dropped the whole generation. A no-op once the call settled.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct FailoverOrchestrator {
    describer: Arc<dyn SketchDescriber>,
    providers: Vec<Arc<dyn ProviderAdapter>>,
    attempt_timeout: Duration,
}

impl FailoverOrchestrator {
    pub fn new(
        describer: Arc<dyn SketchDescriber>,
        providers: Vec<Arc<dyn ProviderAdapter>>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            describer,
            providers,
            attempt_timeout,
        }
    }

    /// Provider ids in priority order
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("generation", %request_id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: GenerationRequest) -> Result<GenerationResult, GenerationError> {
        request.validate().map_err(|e| {
            warn!("Generation request rejected: {}", e);
            GenerationError::Validation(e)
        })?;

        let composed = self.compose(&request).await;
        let prompt_chars = composed.prompt_text.chars().count();
        debug!("Composed prompt: {} chars", prompt_chars);

        let has_seed = request.has_seed();
        let mut attempts: Vec<ProviderAttempt> = Vec::new();
        let mut skipped: Vec<SkippedProvider> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let provider_id = provider.id().to_string();

            if !provider.capabilities().supports(has_seed) {
                let reason = if has_seed {
                    "no image-to-image support"
                } else {
                    "no text-to-image support"
                };
                info!(provider = %provider_id, "Skipping provider: {}", reason);
                reasons.push(format!("{}: skipped, {}", provider_id, reason));
                skipped.push(SkippedProvider {
                    provider_id,
                    reason: reason.to_string(),
                });
                continue;
            }

            let attempt = self
                .attempt(
                    attempts.len() + 1,
                    Arc::clone(provider),
                    composed.prompt_text.clone(),
                    request.sketch_image.clone(),
                )
                .await;

            if let AttemptOutcome::Success(ref url) = attempt.outcome {
                let result_url = url.clone();
                let used_fallback = index > 0;
                info!(
                    provider = %provider_id,
                    attempt = attempts.len() + 1,
                    elapsed_ms = attempt.elapsed.as_millis() as u64,
                    used_fallback,
                    "Image generated"
                );
                attempts.push(attempt);
                return Ok(GenerationResult {
                    result_url,
                    used_fallback,
                    fallback_provider_id: provider_id,
                    description: composed.description,
                    prompt_text: composed.prompt_text,
                    attempts,
                    skipped,
                });
            }

            reasons.push(format!("{}: {}", provider_id, attempt.reason()));
            attempts.push(attempt);
        }

        error!(reasons = ?reasons, "All image providers failed");

        Err(GenerationError::Exhausted {
            attempts,
            skipped,
            reasons,
        })
    }

    /// Describe the sketch (never fails) and build the prompt
    async fn compose(&self, request: &GenerationRequest) -> ComposedPrompt {
        let description = match request.sketch_image {
            Some(ref image) => self.describer.describe(image, request.prior.as_ref()).await,
            None => String::new(),
        };

        PromptComposer::compose(
            &description,
            request.style,
            request.prior.as_ref(),
            request.personal_prompt.as_deref(),
        )
    }

    /// Race one provider call against the attempt timeout.
    ///
    /// The call runs on its own task, aborted on timeout or when this future is
    /// dropped. Abort only cancels at the next await point; a result that
    /// arrives later is dropped.
    async fn attempt(
        &self,
        number: usize,
        provider: Arc<dyn ProviderAdapter>,
        prompt: String,
        seed: Option<SketchImage>,
    ) -> ProviderAttempt {
        let provider_id = provider.id().to_string();
        let started = Instant::now();
        debug!(provider = %provider_id, attempt = number, "Starting provider attempt");

        let handle = tokio::spawn(async move { provider.generate(&prompt, seed.as_ref()).await });
        let _abort = AbortOnDrop(handle.abort_handle());

        let outcome = match tokio::time::timeout(self.attempt_timeout, handle).await {
            Ok(Ok(Ok(url))) => AttemptOutcome::Success(url),
            Ok(Ok(Err(e))) => {
                warn!(provider = %provider_id, attempt = number, "Provider attempt failed: {}", e);
                AttemptOutcome::Failure(e.to_string())
            }
            Ok(Err(join_error)) => {
                let e = ProviderError::Panicked(join_error.to_string());
                warn!(provider = %provider_id, attempt = number, "Provider attempt failed: {}", e);
                AttemptOutcome::Failure(e.to_string())
            }
            Err(_) => {
                warn!(
                    provider = %provider_id,
                    attempt = number,
                    timeout_ms = self.attempt_timeout.as_millis() as u64,
                    "Provider attempt timed out"
                );
                AttemptOutcome::Timeout
            }
        };

        ProviderAttempt {
            provider_id,
            outcome,
            elapsed: started.elapsed(),
        }
    }
}
