// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation request and result types

use std::time::Duration;

use super::style::Style;
use crate::vision::SketchImage;

/// The last live-guess question and the artist's answer to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorExchange {
    pub question: String,
    pub answer: String,
}

impl PriorExchange {
    /// Only a complete pair is useful context
    pub fn from_parts(question: Option<&str>, answer: Option<&str>) -> Option<Self> {
        let question = question.map(str::trim).filter(|q| !q.is_empty())?;
        let answer = answer.map(str::trim).filter(|a| !a.is_empty())?;
        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub sketch_image: Option<SketchImage>,
    pub style: Option<Style>,
    pub prior: Option<PriorExchange>,
    pub personal_prompt: Option<String>,
}

impl GenerationRequest {
    /// A request needs a sketch or a non-blank personal prompt
    pub fn validate(&self) -> Result<(), String> {
        let has_prompt = self
            .personal_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());

        if self.sketch_image.is_none() && !has_prompt {
            return Err("either an image or a personal prompt is required".to_string());
        }
        Ok(())
    }

    pub fn has_seed(&self) -> bool {
        self.sketch_image.is_some()
    }
}

/// How one provider attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    Failure(String),
    Timeout,
}

#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

impl ProviderAttempt {
    /// Short reason suitable for operator logs
    pub fn reason(&self) -> String {
        match &self.outcome {
            AttemptOutcome::Success(_) => "succeeded".to_string(),
            AttemptOutcome::Failure(reason) => reason.clone(),
            AttemptOutcome::Timeout => format!("timed out after {}ms", self.elapsed.as_millis()),
        }
    }
}

/// A provider left out before any call because it cannot serve the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProvider {
    pub provider_id: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub result_url: String,
    pub used_fallback: bool,
    pub fallback_provider_id: String,
    pub description: String,
    pub prompt_text: String,
    /// Every attempt made, in order, including the winning one
    pub attempts: Vec<ProviderAttempt>,
    pub skipped: Vec<SkippedProvider>,
}
