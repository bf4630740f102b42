// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ordered result-extraction strategies
//!
//! Backends do not agree on where the finished image lives in a response.
//! Each adapter declares a list of named strategies, tried in order; the first
//! usable reference wins.

use serde_json::Value;
use tracing::debug;

use super::ProviderError;

pub type ExtractFn = fn(&Value) -> Option<String>;

#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub extract: ExtractFn,
}

impl Strategy {
    pub const fn new(name: &'static str, extract: ExtractFn) -> Self {
        Self { name, extract }
    }
}

/// Run strategies in order and return the first match
pub fn first_match(
    provider: &str,
    strategies: &[Strategy],
    body: &Value,
) -> Result<String, ProviderError> {
    for strategy in strategies {
        if let Some(found) = (strategy.extract)(body) {
            debug!("{}: result found via '{}'", provider, strategy.name);
            return Ok(found);
        }
    }
    Err(ProviderError::ResultNotFound {
        provider: provider.to_string(),
    })
}

/// Accept only references a browser can display directly
pub fn usable_reference(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("https://")
        || value.starts_with("http://")
        || value.starts_with("data:image/")
    {
        Some(value.to_string())
    } else {
        None
    }
}

/// Find a reference in a string, the first usable array item, or an object's `url`
pub fn first_reference(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => usable_reference(s),
        Value::Array(items) => items.iter().find_map(first_reference),
        Value::Object(map) => map.get("url").and_then(first_reference),
        _ => None,
    }
}
