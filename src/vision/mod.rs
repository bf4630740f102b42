// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for inbound sketches
//!
//! This module provides:
//! - Sketch image parsing and validation from data URIs
//! - Sketch description and live guessing via a vision model
//! - Defensive parsing of guess replies

pub mod description_client;
pub mod guess_parser;
pub mod image_utils;

pub use description_client::{DescriptionClient, SketchDescriber, GENERIC_DESCRIPTION};
pub use guess_parser::{Prediction, GENERIC_GUESS};
pub use image_utils::{detect_format, ImageError, SketchImage};
