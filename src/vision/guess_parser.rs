// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Defensive parsing of live-guess replies
//!
//! The vision model is asked for `{"guess": "...", "ethics": 0|1}` but does not
//! always comply. Parsing tries, in order: the whole reply as JSON, the first
//! embedded `{...}` object, then keyword sniffing. If all of those fail the
//! result is a generic guess marked acceptable.
//!
//! The acceptability flag is the model's own self-classification. It is a
//! best-effort heuristic, not a moderation guarantee.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub const GENERIC_GUESS: &str = "a sketch in progress";
pub const MAX_GUESS_WORDS: usize = 6;
pub const MAX_GUESS_CHARS: usize = 60;

/// Result of a live guess. `acceptable` is `None` when the model was unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub guess: String,
    pub acceptable: Option<bool>,
}

impl Prediction {
    /// Conservative classification for replies that could not be understood
    pub fn fallback() -> Self {
        Self {
            guess: GENERIC_GUESS.to_string(),
            acceptable: Some(true),
        }
    }

    /// Neutral result when the upstream call itself failed
    pub fn unavailable() -> Self {
        Self {
            guess: String::new(),
            acceptable: None,
        }
    }

    /// Wire form: 1 = acceptable, 0 = not acceptable
    pub fn ethics_flag(&self) -> Option<u8> {
        self.acceptable.map(u8::from)
    }
}

fn guess_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)["']?guess["']?\s*[:=]\s*["']([^"'\n]{1,120})["']"#)
            .expect("guess pattern is valid")
    })
}

fn ethics_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)["']?ethics["']?\s*[:=]\s*["']?(0|1|true|false)"#)
            .expect("ethics pattern is valid")
    })
}

/// Parse a raw model reply. A guess equal to `previous_guess` is replaced.
pub fn parse_prediction(raw: &str, previous_guess: Option<&str>) -> Prediction {
    let (guess, acceptable) = match extract_json_object(raw) {
        Some(object) => (
            object.get("guess").and_then(Value::as_str).map(str::to_string),
            object.get("ethics").and_then(read_ethics),
        ),
        None => sniff_keywords(raw),
    };

    let guess = guess
        .map(|g| clamp_guess(&g))
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| GENERIC_GUESS.to_string());
    let mut prediction = Prediction {
        guess,
        acceptable: Some(acceptable.unwrap_or(true)),
    };

    if let Some(previous) = previous_guess.map(str::trim).filter(|p| !p.is_empty()) {
        if prediction.guess.eq_ignore_ascii_case(previous) {
            prediction.guess = GENERIC_GUESS.to_string();
        }
    }

    prediction
}

/// Whole reply first, then the outermost `{...}` span
pub fn extract_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let raw = strip_code_fence(text);
    if raw.is_empty() {
        return None;
    }

    let mut candidates = vec![raw];
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            candidates.push(&raw[start..=end]);
        }
    }

    candidates.into_iter().find_map(|candidate| {
        serde_json::from_str::<Value>(candidate)
            .ok()
            .and_then(|parsed| parsed.as_object().cloned())
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip a language tag such as ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().trim_end_matches("```").trim()
}

fn sniff_keywords(raw: &str) -> (Option<String>, Option<bool>) {
    let guess = guess_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let acceptable = ethics_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| matches!(m.as_str().to_ascii_lowercase().as_str(), "1" | "true"));
    (guess, acceptable)
}

/// Accepts 0/1, "0"/"1" and booleans
fn read_ethics(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().and_then(|n| match n {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
        Value::String(s) => match s.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Keep a guess short: first few words, no surrounding punctuation
pub fn clamp_guess(guess: &str) -> String {
    let words: Vec<&str> = guess.split_whitespace().take(MAX_GUESS_WORDS).collect();
    let joined = words.join(" ");
    let cleaned = joined.trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '!');
    cleaned.chars().take(MAX_GUESS_CHARS).collect::<String>().trim().to_string()
}
