// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Builds the bounded generation prompt from sketch analysis and artist input
//!
//! Composition is pure and deterministic. Segment order:
//! 1. Style directive (dominant when present)
//! 2. The artist's own instruction, quoted
//! 3. Sketch description merged with the last guess question and answer
//!
//! The joined text is capped at [`MAX_PROMPT_CHARS`] and cut from the end on
//! a word boundary.

use super::request::PriorExchange;
use super::style::Style;

/// Hard cap on prompt length, in characters
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Subject used when a style or prior answer is given without a description or instruction
pub const DEFAULT_SUBJECT: &str = "a simple hand-drawn sketch";

/// Emitted when there is nothing at all to work with
pub const DEFAULT_PROMPT: &str =
    "Create a polished, colorful illustration based on a simple hand-drawn sketch.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub description: String,
    pub prompt_text: String,
}

pub struct PromptComposer;

impl PromptComposer {
    pub fn compose(
        description: &str,
        style: Option<Style>,
        prior: Option<&PriorExchange>,
        personal_instruction: Option<&str>,
    ) -> ComposedPrompt {
        let description = collapse_whitespace(description);
        let personal = personal_instruction
            .map(collapse_whitespace)
            .filter(|p| !p.is_empty());

        if description.is_empty() && personal.is_none() && style.is_none() && prior.is_none() {
            return ComposedPrompt {
                description,
                prompt_text: DEFAULT_PROMPT.to_string(),
            };
        }

        let mut segments: Vec<String> = Vec::new();

        if let Some(style) = style {
            segments.push(format!(
                "MOST IMPORTANT: render the entire image in {label} style ({traits}). \
                 The {label} style must dominate every element of the picture.",
                label = style.label(),
                traits = style.traits(),
            ));
        }

        if let Some(ref instruction) = personal {
            segments.push(format!(
                "Follow this instruction from the artist: \"{}\".",
                instruction.replace('"', "'")
            ));
        }

        let subject = if !description.is_empty() {
            Some(description.clone())
        } else if personal.is_none() {
            Some(DEFAULT_SUBJECT.to_string())
        } else {
            None
        };

        match (subject, prior) {
            (Some(subject), Some(prior)) => segments.push(format!(
                "The sketch shows {}. When asked \"{}\" the artist answered \"{}\"; \
                 use that answer to settle what the sketch depicts.",
                trim_sentence(&subject),
                prior.question.replace('"', "'"),
                prior.answer.replace('"', "'"),
            )),
            (Some(subject), None) => {
                segments.push(format!("The sketch shows {}.", trim_sentence(&subject)))
            }
            (None, Some(prior)) => segments.push(format!(
                "When asked \"{}\" the artist answered \"{}\".",
                prior.question.replace('"', "'"),
                prior.answer.replace('"', "'"),
            )),
            (None, None) => {}
        }

        let joined = collapse_whitespace(&segments.join(" "));
        let prompt_text = truncate_at_word(&joined, MAX_PROMPT_CHARS);

        ComposedPrompt {
            description,
            prompt_text,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop trailing sentence punctuation so it can be re-terminated
fn trim_sentence(text: &str) -> &str {
    text.trim_end_matches(['.', '!', '?', ' '])
}

/// Cut to at most `max_chars` characters, preferring the last word boundary
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // The next character being a space means the cut already fell between words
    let at_boundary = text[cut..].starts_with(char::is_whitespace);
    let trimmed = if at_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        }
    };

    let trimmed = trimmed.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
    if trimmed.is_empty() {
        head.to_string()
    } else {
        trimmed.to_string()
    }
}
