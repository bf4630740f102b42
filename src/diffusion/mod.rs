// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation: prompt composition and provider failover

pub mod orchestrator;
pub mod prompt_composer;
pub mod providers;
pub mod request;
pub mod style;

pub use orchestrator::{FailoverOrchestrator, GenerationError};
pub use prompt_composer::{ComposedPrompt, PromptComposer};
pub use providers::{build_adapters, Capabilities, ProviderAdapter, ProviderError};
pub use request::{
    AttemptOutcome, GenerationRequest, GenerationResult, PriorExchange, ProviderAttempt,
    SkippedProvider,
};
pub use style::{Style, UnknownStyle};
