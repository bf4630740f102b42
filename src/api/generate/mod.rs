// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint module
//!
//! Provides POST /api/generate for sketch-to-image and prompt-to-image
//! generation with provider failover.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::generate_handler;
pub use request::GenerateRequest;
pub use response::GenerateResponse;
