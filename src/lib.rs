// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod diffusion;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_router, start_server, AppState};
pub use config::{ConfigError, ServerConfig};
pub use diffusion::{
    FailoverOrchestrator, GenerationError, GenerationRequest, GenerationResult, PromptComposer,
    ProviderAdapter, ProviderError, Style,
};
pub use vision::{DescriptionClient, Prediction, SketchDescriber, SketchImage};
