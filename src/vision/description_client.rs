// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sketch description and live guessing via an OpenAI-compatible vision model
//!
//! Neither call ever fails. Transport problems degrade to an empty result;
//! replies that cannot be understood degrade to generic placeholders.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::guess_parser::{parse_prediction, Prediction};
use super::image_utils::SketchImage;
use crate::config::DescriptionConfig;
use crate::diffusion::PriorExchange;

/// Used when the model answers but says nothing usable
pub const GENERIC_DESCRIPTION: &str = "a simple hand-drawn sketch";

const MAX_DESCRIPTION_CHARS: usize = 600;

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

const DESCRIBE_PROMPT: &str = "Describe what this hand-drawn sketch depicts in one or two \
sentences. Mention the main subject, its pose or arrangement, and any notable details. \
Do not comment on drawing quality.";

const PREDICT_PROMPT: &str = "You are playing a drawing guessing game. Guess what this \
unfinished sketch shows in at most four words. Also judge whether the drawing is appropriate \
for all ages. Reply with only a JSON object: {\"guess\": \"...\", \"ethics\": 1} where ethics \
is 1 if appropriate and 0 if not.";

/// The two capabilities the gateway needs from a vision model
#[async_trait]
pub trait SketchDescriber: Send + Sync {
    /// Descriptive paragraph for generation context; empty when unavailable
    async fn describe(&self, image: &SketchImage, context: Option<&PriorExchange>) -> String;

    /// Short live guess plus an acceptability flag
    async fn predict(
        &self,
        image: &SketchImage,
        previous_guess: Option<&str>,
        previous_answer: Option<&str>,
    ) -> Prediction;
}

/// Client for an OpenAI-compatible chat completions endpoint with image input
pub struct DescriptionClient {
    client: Client,
    api_base: String,
    model_name: String,
    api_key: Option<String>,
}

impl DescriptionClient {
    pub fn new(config: &DescriptionConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        let api_base = config.api_base.trim_end_matches('/').to_string();
        info!(
            "Description client configured: api_base={}, model={}, credential={}",
            api_base,
            config.model,
            if config.api_key.is_some() { "set" } else { "missing" }
        );

        Ok(Self {
            client,
            api_base,
            model_name: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// `Err` for transport-level problems, `Ok(None)` for a reply with no usable text
    async fn complete(
        &self,
        prompt: String,
        image: &SketchImage,
        max_tokens: u32,
    ) -> Result<Option<String>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("DESCRIPTION_API_KEY is not set"))?;

        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {"url": image.to_data_uri()}}
                ]),
            }],
            max_tokens,
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.api_base);
        debug!("Description POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "description model returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            ));
        }

        let body = response.text().await?;
        let text = serde_json::from_str::<ChatResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        Ok(text)
    }
}

fn describe_prompt(context: Option<&PriorExchange>) -> String {
    match context {
        Some(prior) => format!(
            "{} Earlier the artist was asked \"{}\" and answered \"{}\". Use that answer to \
             give a new description that differs from the earlier guess where the answer \
             says it was wrong.",
            DESCRIBE_PROMPT, prior.question, prior.answer
        ),
        None => DESCRIBE_PROMPT.to_string(),
    }
}

fn predict_prompt(previous_guess: Option<&str>, previous_answer: Option<&str>) -> String {
    let previous_guess = previous_guess.map(str::trim).filter(|g| !g.is_empty());
    let previous_answer = previous_answer.map(str::trim).filter(|a| !a.is_empty());

    match (previous_guess, previous_answer) {
        (Some(guess), Some(answer)) => format!(
            "{} Your previous guess was \"{}\" and the artist replied \"{}\". Use that reply \
             to refine your guess and do not repeat \"{}\".",
            PREDICT_PROMPT, guess, answer, guess
        ),
        (Some(guess), None) => format!(
            "{} Your previous guess was \"{}\"; give a different guess.",
            PREDICT_PROMPT, guess
        ),
        _ => PREDICT_PROMPT.to_string(),
    }
}

fn clean_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

#[async_trait]
impl SketchDescriber for DescriptionClient {
    async fn describe(&self, image: &SketchImage, context: Option<&PriorExchange>) -> String {
        match self.complete(describe_prompt(context), image, 300).await {
            Ok(Some(text)) => {
                let cleaned = clean_description(&text);
                debug!("Sketch described: {} chars", cleaned.len());
                cleaned
            }
            Ok(None) => {
                warn!("Description reply had no usable text, using generic description");
                GENERIC_DESCRIPTION.to_string()
            }
            Err(e) => {
                warn!("Sketch description failed, continuing without it: {}", e);
                String::new()
            }
        }
    }

    async fn predict(
        &self,
        image: &SketchImage,
        previous_guess: Option<&str>,
        previous_answer: Option<&str>,
    ) -> Prediction {
        let prompt = predict_prompt(previous_guess, previous_answer);
        match self.complete(prompt, image, 60).await {
            Ok(Some(text)) => parse_prediction(&text, previous_guess),
            Ok(None) => {
                warn!("Guess reply had no usable text, using fallback guess");
                Prediction::fallback()
            }
            Err(e) => {
                warn!("Live guess failed: {}", e);
                Prediction::unavailable()
            }
        }
    }
}
